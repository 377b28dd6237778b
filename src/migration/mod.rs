use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_table;
mod m20250901_000002_create_complaints_table;
mod m20250901_000003_create_feedback_table;
mod m20250901_000004_add_voice_proof;
mod m20250901_000005_add_complaints_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_table::Migration),
            Box::new(m20250901_000002_create_complaints_table::Migration),
            Box::new(m20250901_000003_create_feedback_table::Migration),
            Box::new(m20250901_000004_add_voice_proof::Migration),
            Box::new(m20250901_000005_add_complaints_indexes::Migration),
        ]
    }
}
