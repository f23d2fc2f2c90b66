pub use sea_orm_migration::prelude::*;

mod m20260201_000001_ledger;
mod m20260201_000002_budgets;
mod m20260301_000003_import_details;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_ledger::Migration),
            Box::new(m20260201_000002_budgets::Migration),
            Box::new(m20260301_000003_import_details::Migration),
        ]
    }
}
