use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    UserId,
    Merchant,
    Description,
    ImportKey,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite takes one column per ALTER TABLE.
        for column in [
            Transactions::Merchant,
            Transactions::Description,
            Transactions::ImportKey,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Transactions::Table)
                        .add_column(ColumnDef::new(column).string())
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("uidx-transactions-user_id-import_key")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::ImportKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-transactions-user_id-import_key")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;

        for column in [
            Transactions::ImportKey,
            Transactions::Description,
            Transactions::Merchant,
        ] {
            manager
                .alter_table(
                    Table::alter()
                        .table(Transactions::Table)
                        .drop_column(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
