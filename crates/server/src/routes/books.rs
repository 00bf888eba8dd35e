use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::pagination::{PagedList, Pagination};
use models::book::FreightOption;
use serde::Deserialize;
use uuid::Uuid;

use service::auth::domain::Claims;
use service::books::domain::{Book, BookListItem, DonorRef, FreightChoice, NewBook};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
}

fn bad_request(detail: &str) -> JsonApiError {
    JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.to_string()))
}

/// Donate a book. Multipart form: `title`, `author`, `freight_option` and
/// an `image` file part carrying the cover.
#[utoipa::path(post, path = "/books", tag = "books",
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn create_book(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Book>), JsonApiError> {
    let mut title: Option<String> = None;
    let mut author: Option<String> = None;
    let mut freight: Option<String> = None;
    let mut image_name: Option<String> = None;
    let mut image_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("malformed multipart body: {e}")))?
    {
        // name() borrows the field, which text()/bytes() consume
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = Some(field.text().await.map_err(|e| bad_request(&e.to_string()))?)
            }
            Some("author") => {
                author = Some(field.text().await.map_err(|e| bad_request(&e.to_string()))?)
            }
            Some("freight_option") => {
                freight = Some(field.text().await.map_err(|e| bad_request(&e.to_string()))?)
            }
            Some("image") => {
                image_name = field.file_name().map(str::to_string);
                image_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(&e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| bad_request("title is required"))?;
    let author = author.ok_or_else(|| bad_request("author is required"))?;
    let freight = freight.ok_or_else(|| bad_request("freight_option is required"))?;
    let image_bytes = image_bytes.ok_or_else(|| bad_request("image is required"))?;
    let freight_option = FreightOption::parse(&freight)
        .map_err(|e| bad_request(&e.to_string()))?;

    let donor = DonorRef { id: claims.uid, name: claims.name, email: claims.sub };
    let input = NewBook {
        title,
        author,
        image_name: image_name.unwrap_or_else(|| "upload".to_string()),
        freight_option,
    };

    let book = state.books.insert(&donor, input, &image_bytes).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Approve a donated book. The service rejects callers without the admin
/// profile.
#[utoipa::path(put, path = "/books/{id}/approve", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    responses((status = 200, description = "Approved"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn approve_book(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, JsonApiError> {
    let book = state.books.approve(claims.profile, id).await?;
    Ok(Json(book))
}

/// Paged listing over all books with donor projections.
#[utoipa::path(get, path = "/books", tag = "books",
    responses((status = 200, description = "Paged books"), (status = 401, description = "Unauthorized")))]
pub async fn list_books(
    State(state): State<ServerState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PagedList<BookListItem>>, JsonApiError> {
    let opts = Pagination { page: q.page.unwrap_or(1), per_page: q.per_page.unwrap_or(20) };
    let page = state.books.get_all(opts).await?;
    Ok(Json(page))
}

/// Newest approved books, 15 per page.
#[utoipa::path(get, path = "/books/recent", tag = "books",
    responses((status = 200, description = "Recent approved books")))]
pub async fn recent_books(
    State(state): State<ServerState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<Book>>, JsonApiError> {
    let books = state.books.recent(q.page.unwrap_or(1)).await?;
    Ok(Json(books))
}

/// Search approved books by title or author substring.
#[utoipa::path(get, path = "/books/search", tag = "books",
    responses((status = 200, description = "Matching approved books"), (status = 400, description = "Bad Request")))]
pub async fn search_books(
    State(state): State<ServerState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Book>>, JsonApiError> {
    let books = match (q.title, q.author) {
        (Some(title), _) => state.books.search_by_title(&title).await?,
        (None, Some(author)) => state.books.search_by_author(&author).await?,
        (None, None) => return Err(bad_request("provide a title or author query parameter")),
    };
    Ok(Json(books))
}

/// Fetch a single book.
#[utoipa::path(get, path = "/books/{id}", tag = "books",
    params(("id" = Uuid, Path, description = "Book id")),
    responses((status = 200, description = "Book"), (status = 404, description = "Not Found")))]
pub async fn get_book(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, JsonApiError> {
    let book = state.books.get(id).await?;
    Ok(Json(book))
}

/// Enumerate freight options for listing forms.
#[utoipa::path(get, path = "/books/freight-options", tag = "books",
    responses((status = 200, description = "Freight options")))]
pub async fn freight_options(State(state): State<ServerState>) -> Json<Vec<FreightChoice>> {
    Json(state.books.freight_options())
}
