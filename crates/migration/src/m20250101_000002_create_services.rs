//! Create `services` table.
//! Each service belongs to one category; coordinates come from geocoding the address.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(pk_auto(Services::Id))
                    .col(string_len(Services::Name, 200))
                    .col(string_len_null(Services::Address, 255))
                    .col(string_len_null(Services::Phone, 100))
                    .col(string_len_null(Services::Schedule, 255))
                    .col(string_len_null(Services::SocialMedia, 255))
                    .col(text_null(Services::Description))
                    .col(double_null(Services::Latitude))
                    .col(double_null(Services::Longitude))
                    .col(integer(Services::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_category")
                            .from(Services::Table, Services::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Services::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    Name,
    Address,
    Phone,
    Schedule,
    SocialMedia,
    Description,
    Latitude,
    Longitude,
    CategoryId,
}

#[derive(DeriveIden)]
enum Categories { Table, Id }
