//! Create `book` table with FK to `user` (the donor).
//!
//! `approved` defaults to false; a book only shows in public listings once
//! an administrator flips it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Book::Table)
                    .if_not_exists()
                    .col(uuid(Book::Id).primary_key())
                    .col(uuid(Book::UserId).not_null())
                    .col(string_len(Book::Title, 256).not_null())
                    .col(string_len(Book::Author, 128).not_null())
                    .col(string_len(Book::Image, 256).not_null())
                    .col(string_len(Book::FreightOption, 32).not_null())
                    .col(boolean(Book::Approved).not_null().default(false))
                    .col(timestamp_with_time_zone(Book::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Book::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_book_user")
                            .from(Book::Table, Book::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Book::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Book { Table, Id, UserId, Title, Author, Image, FreightOption, Approved, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
