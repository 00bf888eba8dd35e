use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub postal_code: String,
    pub linkedin: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct BookDoc {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub author: String,
    pub image: String,
    pub freight_option: String,
    pub approved: bool,
}

#[derive(ToSchema)]
pub struct FreightChoiceDoc {
    pub value: String,
    pub text: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::books::create_book,
        crate::routes::books::approve_book,
        crate::routes::books::list_books,
        crate::routes::books::recent_books,
        crate::routes::books::search_books,
        crate::routes::books::get_book,
        crate::routes::books::freight_options,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            BookDoc,
            FreightChoiceDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "books")
    )
)]
pub struct ApiDoc;
