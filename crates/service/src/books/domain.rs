use chrono::{DateTime, Utc};
use models::book::FreightOption;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business view of a book listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    /// Stored cover file name, `{id}.{ext}`.
    pub image: String,
    pub freight_option: FreightOption,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Donation input. The image travels separately as raw bytes; `image_name`
/// is the client-side file name the extension is taken from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub image_name: String,
    pub freight_option: FreightOption,
}

/// Projection of the donor attached to admin listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One row of the paged admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListItem {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub approved: bool,
    pub freight_option: FreightOption,
    pub user: Option<DonorRef>,
}

/// Freight option as presented to listing forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightChoice {
    pub value: String,
    pub text: String,
}
