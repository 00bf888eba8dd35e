use std::sync::Arc;

use chrono::Utc;
use common::pagination::{PagedList, Pagination};
use models::book::{self, FreightOption};
use models::user::Profile;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{Book, BookListItem, DonorRef, FreightChoice, NewBook};
use super::repository::BookRepository;
use crate::errors::ServiceError;
use crate::mail::{Email, Mailer};
use crate::upload::{self, ImageStore};

/// Fixed page size of the public newest-approved listing.
const RECENT_PAGE_SIZE: u64 = 15;

/// Book business service independent of web framework.
pub struct BookService<R: BookRepository> {
    repo: Arc<R>,
    images: Arc<dyn ImageStore>,
    mailer: Arc<dyn Mailer>,
    /// Operations inbox notified on every donation.
    notify_to: String,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(
        repo: Arc<R>,
        images: Arc<dyn ImageStore>,
        mailer: Arc<dyn Mailer>,
        notify_to: String,
    ) -> Self {
        Self { repo, images, mailer, notify_to }
    }

    /// Donate a book: validate, normalize the cover name, upload the cover,
    /// persist, then notify the operations inbox.
    ///
    /// Validation aborts before any side effect and an upload failure aborts
    /// before persistence. A mail failure after persistence does not fail
    /// the donation; the notification is advisory.
    #[instrument(skip(self, donor, input, image_bytes), fields(donor = %donor.id, title = %input.title))]
    pub async fn insert(
        &self,
        donor: &DonorRef,
        input: NewBook,
        image_bytes: &[u8],
    ) -> Result<Book, ServiceError> {
        book::validate_title(&input.title)?;
        book::validate_author(&input.author)?;

        let id = Uuid::new_v4();
        let image = upload::format_image_name(&input.image_name, id, image_bytes)?;
        self.images.save(&image, image_bytes).await?;

        let now = Utc::now();
        let inserted = self
            .repo
            .insert(Book {
                id,
                user_id: donor.id,
                title: input.title,
                author: input.author,
                image,
                freight_option: input.freight_option,
                approved: false,
                created_at: now,
                updated_at: now,
            })
            .await?;

        if let Err(e) = self.mailer.send(self.donation_notice(&inserted, donor)).await {
            warn!(book_id = %inserted.id, error = %e, "donation notification failed");
        }

        info!(book_id = %inserted.id, donor = %donor.id, "book_donated");
        Ok(inserted)
    }

    /// Approve a donated book so it shows in public listings. Administrators
    /// only. Approving an already-approved book succeeds.
    #[instrument(skip(self))]
    pub async fn approve(&self, actor: Profile, id: Uuid) -> Result<Book, ServiceError> {
        if actor != Profile::Admin {
            return Err(ServiceError::forbidden("approving a book"));
        }
        let updated = self.repo.set_approved(id).await?.ok_or_else(|| {
            ServiceError::not_found("book")
        })?;
        info!(book_id = %updated.id, "book_approved");
        Ok(updated)
    }

    /// Fetch a single book by id.
    pub async fn get(&self, id: Uuid) -> Result<Book, ServiceError> {
        self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("book"))
    }

    /// Paged listing over all books (approved or not) with donor
    /// projections; the total is the real row count of the result set.
    pub async fn get_all(&self, opts: Pagination) -> Result<PagedList<BookListItem>, ServiceError> {
        let (items, total) = self.repo.page_with_donors(opts).await?;
        Ok(PagedList::new(opts, total, items))
    }

    /// Newest approved books, fixed page size of 15. `page` is 1-based.
    pub async fn recent(&self, page: u32) -> Result<Vec<Book>, ServiceError> {
        let page_idx = u64::from(page.max(1)) - 1;
        self.repo.recent_approved(page_idx, RECENT_PAGE_SIZE).await
    }

    /// Case-insensitive title search over approved books.
    pub async fn search_by_title(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::Validation("search term is required".into()));
        }
        self.repo.search_title(term).await
    }

    /// Case-insensitive author search over approved books.
    pub async fn search_by_author(&self, term: &str) -> Result<Vec<Book>, ServiceError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::Validation("search term is required".into()));
        }
        self.repo.search_author(term).await
    }

    /// Freight options as `{ value, text }` pairs for listing forms.
    pub fn freight_options(&self) -> Vec<FreightChoice> {
        FreightOption::ALL
            .iter()
            .map(|opt| FreightChoice { value: opt.as_str().into(), text: opt.label().into() })
            .collect()
    }

    fn donation_notice(&self, book: &Book, donor: &DonorRef) -> Email {
        Email {
            to: self.notify_to.clone(),
            subject: format!("New book donated: {}", book.title),
            body: format!(
                "{title} by {author} was donated by {donor_name} <{donor_email}>.\n\
                 Freight: {freight}\nCover: {cover}\n\nThe listing is waiting for approval.",
                title = book.title,
                author = book.author,
                donor_name = donor.name,
                donor_email = donor.email,
                freight = book.freight_option.label(),
                cover = self.images.url(&book.image),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::repository::mock::MockBookRepository;
    use crate::mail::mock::{FailingMailer, MockMailer};
    use crate::upload::mock::{FailingImageStore, MockImageStore};
    use chrono::Duration;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n0000";

    fn donor() -> DonorRef {
        DonorRef {
            id: Uuid::new_v4(),
            name: "Alice Donor".into(),
            email: "alice@example.com".into(),
        }
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.into(),
            author: "Some Author".into(),
            image_name: "cover.png".into(),
            freight_option: FreightOption::City,
        }
    }

    fn seeded(repo: &MockBookRepository, title: &str, author: &str, approved: bool, age_mins: i64) -> Book {
        let id = Uuid::new_v4();
        let at = Utc::now() - Duration::minutes(age_mins);
        let book = Book {
            id,
            user_id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            image: format!("{id}.png"),
            freight_option: FreightOption::WithoutFreight,
            approved,
            created_at: at,
            updated_at: at,
        };
        repo.seed(book.clone());
        book
    }

    struct Harness {
        repo: Arc<MockBookRepository>,
        images: Arc<MockImageStore>,
        mailer: Arc<MockMailer>,
        svc: BookService<MockBookRepository>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(MockBookRepository::default());
        let images = Arc::new(MockImageStore::default());
        let mailer = Arc::new(MockMailer::default());
        let svc = BookService::new(
            repo.clone(),
            images.clone(),
            mailer.clone(),
            "ops@bookdrop.dev".into(),
        );
        Harness { repo, images, mailer, svc }
    }

    #[tokio::test]
    async fn insert_uploads_persists_and_notifies() {
        let h = harness();
        let donor = donor();

        let book = h.svc.insert(&donor, new_book("Dom Casmurro"), PNG_BYTES).await.unwrap();

        assert!(!book.approved);
        assert_eq!(book.user_id, donor.id);
        assert_eq!(book.image, format!("{}.png", book.id));
        assert!(h.images.contains(&book.image));
        assert_eq!(h.repo.len(), 1);

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ops@bookdrop.dev");
        assert!(sent[0].subject.contains("Dom Casmurro"));
        assert!(sent[0].body.contains("alice@example.com"));
    }

    #[tokio::test]
    async fn insert_validation_failure_has_no_side_effects() {
        let h = harness();
        let mut input = new_book("");
        input.title = " ".into();

        let res = h.svc.insert(&donor(), input, PNG_BYTES).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));
        assert!(h.repo.is_empty());
        assert!(h.images.saved_names().is_empty());
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_non_image_payload_before_persisting() {
        let h = harness();
        let res = h.svc.insert(&donor(), new_book("Vidas Secas"), b"not an image").await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(h.repo.is_empty());
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn insert_upload_failure_aborts_before_persistence() {
        let repo = Arc::new(MockBookRepository::default());
        let svc = BookService::new(
            repo.clone(),
            Arc::new(FailingImageStore),
            Arc::new(MockMailer::default()),
            "ops@bookdrop.dev".into(),
        );
        let res = svc.insert(&donor(), new_book("Quincas Borba"), PNG_BYTES).await;
        assert!(matches!(res, Err(ServiceError::Upload(_))));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn insert_survives_mail_failure() {
        let repo = Arc::new(MockBookRepository::default());
        let svc = BookService::new(
            repo.clone(),
            Arc::new(MockImageStore::default()),
            Arc::new(FailingMailer),
            "ops@bookdrop.dev".into(),
        );
        let book = svc.insert(&donor(), new_book("Iracema"), PNG_BYTES).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert!(!book.approved);
    }

    #[tokio::test]
    async fn approve_requires_admin_and_existing_book() {
        let h = harness();
        let book = seeded(&h.repo, "O Cortiço", "Aluísio Azevedo", false, 5);

        let res = h.svc.approve(Profile::User, book.id).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));

        let res = h.svc.approve(Profile::Admin, Uuid::new_v4()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));

        let approved = h.svc.approve(Profile::Admin, book.id).await.unwrap();
        assert!(approved.approved);

        // idempotent
        let again = h.svc.approve(Profile::Admin, book.id).await.unwrap();
        assert!(again.approved);
    }

    #[tokio::test]
    async fn get_all_reports_real_total_and_donor_projection() {
        let h = harness();
        let donor = donor();
        h.repo.register_donor(donor.clone());
        for i in 0..5i64 {
            let id = Uuid::new_v4();
            let at = Utc::now() - Duration::minutes(i);
            h.repo.seed(Book {
                id,
                user_id: donor.id,
                title: format!("Book {i}"),
                author: "A".into(),
                image: format!("{id}.png"),
                freight_option: FreightOption::State,
                approved: i % 2 == 0,
                created_at: at,
                updated_at: at,
            });
        }

        let page = h.svc.get_all(Pagination { page: 1, per_page: 2 }).await.unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items_per_page, 2);
        // newest first: Book 0 was created last (0 minutes ago)
        assert_eq!(page.items[0].title, "Book 0");
        let donor_ref = page.items[0].user.as_ref().expect("donor projection");
        assert_eq!(donor_ref.email, donor.email);

        let last = h.svc.get_all(Pagination { page: 3, per_page: 2 }).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.total_items, 5);
    }

    #[tokio::test]
    async fn recent_is_approved_only_newest_first_pages_of_15() {
        let h = harness();
        for i in 0..20i64 {
            seeded(&h.repo, &format!("Approved {i}"), "A", true, i);
        }
        seeded(&h.repo, "Pending", "A", false, 0);

        let first = h.svc.recent(1).await.unwrap();
        assert_eq!(first.len(), 15);
        assert!(first.iter().all(|b| b.approved));
        assert_eq!(first[0].title, "Approved 0");

        let second = h.svc.recent(2).await.unwrap();
        assert_eq!(second.len(), 5);

        // page 0 is treated as page 1
        let zero = h.svc.recent(0).await.unwrap();
        assert_eq!(zero[0].title, "Approved 0");
    }

    #[tokio::test]
    async fn search_matches_substring_on_approved_only() {
        let h = harness();
        seeded(&h.repo, "Memórias Póstumas de Brás Cubas", "Machado de Assis", true, 1);
        seeded(&h.repo, "Dom Casmurro", "Machado de Assis", false, 2);
        seeded(&h.repo, "A Hora da Estrela", "Clarice Lispector", true, 3);

        let by_title = h.svc.search_by_title("memórias").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Memórias Póstumas de Brás Cubas");

        // the unapproved Machado book must not show
        let by_author = h.svc.search_by_author("machado").await.unwrap();
        assert_eq!(by_author.len(), 1);

        assert!(matches!(
            h.svc.search_by_title("   ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn freight_options_expose_value_and_text() {
        let h = harness();
        let options = h.svc.freight_options();
        assert_eq!(options.len(), 5);
        assert!(options.iter().any(|o| o.value == "without_freight"));
        assert!(options.iter().all(|o| !o.text.is_empty()));
    }
}
