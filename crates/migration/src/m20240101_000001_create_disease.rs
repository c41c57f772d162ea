//! Create `disease` table.
//!
//! The primary key is a database-assigned sequence; clients never choose ids.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Disease::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Disease::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Disease::Name, 255).not_null())
                    .col(
                        ColumnDef::new(Disease::Description)
                            .string_len(2000)
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Disease::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Disease { Table, Id, Name, Description }
