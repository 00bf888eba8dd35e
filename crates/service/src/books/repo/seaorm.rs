use async_trait::async_trait;
use chrono::Utc;
use common::pagination::Pagination;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use models::book::{self, FreightOption};
use models::user;

use crate::books::domain::{Book, BookListItem, DonorRef};
use crate::books::repository::BookRepository;
use crate::errors::ServiceError;

/// SeaORM-backed book repository.
pub struct SeaOrmBookRepository {
    pub db: DatabaseConnection,
}

fn to_book(m: book::Model) -> Result<Book, ServiceError> {
    let freight_option = FreightOption::parse(&m.freight_option)?;
    Ok(Book {
        id: m.id,
        user_id: m.user_id,
        title: m.title,
        author: m.author,
        image: m.image,
        freight_option,
        approved: m.approved,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

fn to_donor(m: user::Model) -> DonorRef {
    DonorRef { id: m.id, name: m.name, email: m.email }
}

/// `LOWER(col) LIKE %term%`, the portable case-insensitive substring match.
fn contains_lower(col: book::Column, term: &str) -> sea_orm::sea_query::SimpleExpr {
    let needle = format!("%{}%", term.to_lowercase());
    Expr::expr(Func::lower(Expr::col((book::Entity, col)))).like(needle)
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn insert(&self, b: Book) -> Result<Book, ServiceError> {
        let am = book::ActiveModel {
            id: Set(b.id),
            user_id: Set(b.user_id),
            title: Set(b.title.clone()),
            author: Set(b.author.clone()),
            image: Set(b.image.clone()),
            freight_option: Set(b.freight_option.as_str().to_string()),
            approved: Set(b.approved),
            created_at: Set(b.created_at.into()),
            updated_at: Set(b.updated_at.into()),
        };
        let inserted = am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        to_book(inserted)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
        let found = book::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        found.map(to_book).transpose()
    }

    async fn set_approved(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
        let found = book::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let Some(found) = found else { return Ok(None) };
        let mut am: book::ActiveModel = found.into();
        am.approved = Set(true);
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Some(to_book(updated)?))
    }

    async fn page_with_donors(
        &self,
        opts: Pagination,
    ) -> Result<(Vec<BookListItem>, u64), ServiceError> {
        let (page_idx, per_page) = opts.normalize();
        let paginator = book::Entity::find()
            .find_also_related(user::Entity)
            .order_by_desc(book::Column::CreatedAt)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(|e| ServiceError::Db(e.to_string()))?;
        let rows = paginator
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let mut items = Vec::with_capacity(rows.len());
        for (b, donor) in rows {
            let b = to_book(b)?;
            items.push(BookListItem {
                id: b.id,
                title: b.title,
                author: b.author,
                approved: b.approved,
                freight_option: b.freight_option,
                user: donor.map(to_donor),
            });
        }
        Ok((items, total))
    }

    async fn recent_approved(
        &self,
        page_idx: u64,
        per_page: u64,
    ) -> Result<Vec<Book>, ServiceError> {
        let rows = book::Entity::find()
            .filter(book::Column::Approved.eq(true))
            .order_by_desc(book::Column::CreatedAt)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        rows.into_iter().map(to_book).collect()
    }

    async fn search_title(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
        let rows = book::Entity::find()
            .filter(book::Column::Approved.eq(true))
            .filter(contains_lower(book::Column::Title, term))
            .order_by_desc(book::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        rows.into_iter().map(to_book).collect()
    }

    async fn search_author(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
        let rows = book::Entity::find()
            .filter(book::Column::Approved.eq(true))
            .filter(contains_lower(book::Column::Author, term))
            .order_by_desc(book::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        rows.into_iter().map(to_book).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::user::Profile;

    #[tokio::test]
    async fn book_repository_round_trip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let repo = SeaOrmBookRepository { db: db.clone() };

        let email = format!("repo_{}@example.com", Uuid::new_v4());
        let donor =
            models::user::create(&db, &email, "Repo Donor", "hash", "01310-100", None, Profile::User)
                .await?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let inserted = repo
            .insert(Book {
                id,
                user_id: donor.id,
                title: format!("Capitães da Areia {id}"),
                author: "Jorge Amado".into(),
                image: format!("{id}.png"),
                freight_option: FreightOption::Country,
                approved: false,
                created_at: now,
                updated_at: now,
            })
            .await?;
        assert!(!inserted.approved);

        let found = repo.find(id).await?.expect("inserted book found");
        assert_eq!(found.freight_option, FreightOption::Country);

        // unapproved books stay out of search
        let hits = repo.search_title(&format!("areia {id}")).await?;
        assert!(hits.is_empty());

        let approved = repo.set_approved(id).await?.expect("book exists");
        assert!(approved.approved);
        assert!(repo.set_approved(Uuid::new_v4()).await?.is_none());

        // case-insensitive substring after approval
        let hits = repo.search_title(&format!("CAPITÃES DA AREIA {id}")).await?;
        assert_eq!(hits.len(), 1);

        let (page, total) = repo
            .page_with_donors(Pagination { page: 1, per_page: 50 })
            .await?;
        assert!(total >= 1);
        let row = page.iter().find(|item| item.id == id).expect("row in first page");
        assert_eq!(row.user.as_ref().map(|d| d.email.clone()), Some(email));

        book::Entity::delete_by_id(id).exec(&db).await?;
        models::user::Entity::delete_by_id(donor.id).exec(&db).await?;
        Ok(())
    }
}
