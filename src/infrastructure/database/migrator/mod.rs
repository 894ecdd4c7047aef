//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_follows;
mod m20240101_000003_create_articles;
mod m20240101_000004_create_tags;
mod m20240101_000005_create_favorites;
mod m20240101_000006_create_comments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_follows::Migration),
            Box::new(m20240101_000003_create_articles::Migration),
            Box::new(m20240101_000004_create_tags::Migration),
            Box::new(m20240101_000005_create_favorites::Migration),
            Box::new(m20240101_000006_create_comments::Migration),
        ]
    }
}
