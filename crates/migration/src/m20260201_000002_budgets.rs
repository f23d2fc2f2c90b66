use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    UserId,
    CategoryId,
    Month,
    LimitMinor,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::CategoryId).blob().not_null())
                    // Always the first day of the month the limit takes effect.
                    .col(ColumnDef::new(Budgets::Month).date().not_null())
                    .col(ColumnDef::new(Budgets::LimitMinor).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-category_id")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-user_id-category_id-month-unique")
                    .table(Budgets::Table)
                    .col(Budgets::UserId)
                    .col(Budgets::CategoryId)
                    .col(Budgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        Ok(())
    }
}
