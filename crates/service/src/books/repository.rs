use async_trait::async_trait;
use common::pagination::Pagination;
use uuid::Uuid;

use super::domain::{Book, BookListItem, DonorRef};
use crate::errors::ServiceError;

/// Repository abstraction for book persistence.
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn insert(&self, book: Book) -> Result<Book, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<Book>, ServiceError>;
    /// Flip `approved` on. Returns the updated book, `None` when missing.
    async fn set_approved(&self, id: Uuid) -> Result<Option<Book>, ServiceError>;
    /// One page of all books (approved or not) with donor projections,
    /// newest first, plus the total row count.
    async fn page_with_donors(
        &self,
        opts: Pagination,
    ) -> Result<(Vec<BookListItem>, u64), ServiceError>;
    /// One page of approved books, newest first.
    async fn recent_approved(&self, page_idx: u64, per_page: u64)
        -> Result<Vec<Book>, ServiceError>;
    /// Case-insensitive substring search over approved books.
    async fn search_title(&self, term: &str) -> Result<Vec<Book>, ServiceError>;
    async fn search_author(&self, term: &str) -> Result<Vec<Book>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockBookRepository {
        books: Mutex<Vec<Book>>,
        donors: Mutex<HashMap<Uuid, DonorRef>>, // key: user_id
    }

    impl MockBookRepository {
        pub fn register_donor(&self, donor: DonorRef) {
            self.donors.lock().unwrap().insert(donor.id, donor);
        }

        pub fn seed(&self, book: Book) {
            self.books.lock().unwrap().push(book);
        }

        pub fn len(&self) -> usize {
            self.books.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn newest_first(&self) -> Vec<Book> {
            let mut books = self.books.lock().unwrap().clone();
            books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            books
        }
    }

    #[async_trait]
    impl BookRepository for MockBookRepository {
        async fn insert(&self, book: Book) -> Result<Book, ServiceError> {
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn find(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
            Ok(self.books.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }

        async fn set_approved(&self, id: Uuid) -> Result<Option<Book>, ServiceError> {
            let mut books = self.books.lock().unwrap();
            match books.iter_mut().find(|b| b.id == id) {
                Some(book) => {
                    book.approved = true;
                    book.updated_at = chrono::Utc::now();
                    Ok(Some(book.clone()))
                }
                None => Ok(None),
            }
        }

        async fn page_with_donors(
            &self,
            opts: Pagination,
        ) -> Result<(Vec<BookListItem>, u64), ServiceError> {
            let (page_idx, per_page) = opts.normalize();
            let books = self.newest_first();
            let total = books.len() as u64;
            let donors = self.donors.lock().unwrap();
            let items = books
                .into_iter()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .map(|b| BookListItem {
                    id: b.id,
                    title: b.title,
                    author: b.author,
                    approved: b.approved,
                    freight_option: b.freight_option,
                    user: donors.get(&b.user_id).cloned(),
                })
                .collect();
            Ok((items, total))
        }

        async fn recent_approved(
            &self,
            page_idx: u64,
            per_page: u64,
        ) -> Result<Vec<Book>, ServiceError> {
            Ok(self
                .newest_first()
                .into_iter()
                .filter(|b| b.approved)
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .collect())
        }

        async fn search_title(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
            let needle = term.to_lowercase();
            Ok(self
                .newest_first()
                .into_iter()
                .filter(|b| b.approved && b.title.to_lowercase().contains(&needle))
                .collect())
        }

        async fn search_author(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
            let needle = term.to_lowercase();
            Ok(self
                .newest_first()
                .into_iter()
                .filter(|b| b.approved && b.author.to_lowercase().contains(&needle))
                .collect())
        }
    }
}
