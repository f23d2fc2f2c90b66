use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    IsSystem,
}

#[derive(Iden)]
enum CategoryAliases {
    Table,
    Id,
    CategoryId,
    Alias,
    AliasNorm,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    OccurredOn,
    AmountMinor,
    Category,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Categories::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryAliases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryAliases::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CategoryAliases::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CategoryAliases::Alias).string().not_null())
                    .col(
                        ColumnDef::new(CategoryAliases::AliasNorm)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_aliases-category_id")
                            .from(CategoryAliases::Table, CategoryAliases::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_aliases-alias_norm-unique")
                    .table(CategoryAliases::Table)
                    .col(CategoryAliases::AliasNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::OccurredOn).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-occurred_on")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::OccurredOn)
                    .to_owned(),
            )
            .await?;

        // Every label that matches nothing resolves here.
        let db = manager.get_connection();
        let backend = manager.get_database_backend();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO categories (id, name, name_norm, is_system) VALUES (?, ?, ?, ?);",
            vec![
                Uuid::new_v4().as_bytes().to_vec().into(),
                "Uncategorized".into(),
                "uncategorized".into(),
                true.into(),
            ],
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryAliases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
