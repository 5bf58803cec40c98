//! Create `menu_buttons` table.
//! Self-referential tree; deleting a parent detaches its children.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuButtons::Table)
                    .if_not_exists()
                    .col(pk_auto(MenuButtons::Id))
                    .col(string_len(MenuButtons::Text, 100))
                    .col(integer_null(MenuButtons::ParentId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_buttons_parent")
                            .from(MenuButtons::Table, MenuButtons::ParentId)
                            .to(MenuButtons::Table, MenuButtons::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MenuButtons::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MenuButtons {
    Table,
    Id,
    Text,
    ParentId,
}
