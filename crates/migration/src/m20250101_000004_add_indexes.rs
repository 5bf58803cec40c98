use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Services: composite unique (name, category_id)
        manager
            .create_index(
                Index::create()
                    .name("uq_service_name_category")
                    .table(Services::Table)
                    .col(Services::Name)
                    .col(Services::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Services: index on category_id for category browsing
        manager
            .create_index(
                Index::create()
                    .name("idx_services_category")
                    .table(Services::Table)
                    .col(Services::CategoryId)
                    .to_owned(),
            )
            .await?;

        // MenuButtons: index on parent_id for tree traversal
        manager
            .create_index(
                Index::create()
                    .name("idx_menu_buttons_parent")
                    .table(MenuButtons::Table)
                    .col(MenuButtons::ParentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_service_name_category").table(Services::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_services_category").table(Services::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_menu_buttons_parent").table(MenuButtons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Services { Table, Name, CategoryId }

#[derive(DeriveIden)]
enum MenuButtons { Table, ParentId }
