//! Secondary indexes for the public listing and search paths.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Newest-approved-first listing
        manager
            .create_index(
                Index::create()
                    .name("idx_book_approved_created_at")
                    .table(Book::Table)
                    .col(Book::Approved)
                    .col(Book::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_book_title")
                    .table(Book::Table)
                    .col(Book::Title)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_book_author")
                    .table(Book::Table)
                    .col(Book::Author)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_book_user_id")
                    .table(Book::Table)
                    .col(Book::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_book_approved_created_at",
            "idx_book_title",
            "idx_book_author",
            "idx_book_user_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Book::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Book { Table, UserId, Title, Author, Approved, CreatedAt }
