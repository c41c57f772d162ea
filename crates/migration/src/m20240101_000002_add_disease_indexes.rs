use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Disease: index on name, the default user-facing sort key
        manager
            .create_index(
                Index::create()
                    .name("idx_disease_name")
                    .table(Disease::Table)
                    .col(Disease::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_disease_name").table(Disease::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Disease { Table, Name }
