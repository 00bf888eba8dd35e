use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::books::{repo::seaorm::SeaOrmBookRepository, service::BookService};
use service::mail::{HttpMailer, LogMailer, Mailer};
use service::upload::FsImageStore;

use crate::routes::{self, auth, ImagesDir};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Bind address from config, overridable via `SERVER_HOST`/`SERVER_PORT`.
fn load_bind_addr(cfg: &configs::ServerConfig) -> anyhow::Result<SocketAddr> {
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| cfg.host.clone());
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // Config file when usable, env-driven defaults otherwise. The schema is
    // owned by the migration crate and applied at boot.
    let (cfg, db) = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => {
            let db = models::db::connect_with(&cfg.database).await?;
            (cfg, db)
        }
        Err(e) => {
            info!(error = %e, "no usable config file; using env defaults");
            (configs::AppConfig::default(), models::db::connect().await?)
        }
    };
    migration::Migrator::up(&db, None).await?;

    // Collaborators for the donation flow
    let images = Arc::new(FsImageStore::new(
        cfg.storage.root.clone(),
        cfg.storage.public_base_url.clone(),
    ));
    let (mailer, notify_to): (Arc<dyn Mailer>, String) = match &cfg.mail {
        Some(mail) => (Arc::new(HttpMailer::new(mail)), mail.contact.clone()),
        None => (Arc::new(LogMailer), "contact@bookdrop.local".to_string()),
    };
    let books = Arc::new(BookService::new(
        Arc::new(SeaOrmBookRepository { db: db.clone() }),
        images,
        mailer,
        notify_to,
    ));

    // JWT secret
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret },
        books,
    };

    // Build router; stored covers are served back from the storage root
    let images_dir = ImagesDir {
        route: cfg.storage.public_base_url.clone(),
        dir: cfg.storage.root.clone().into(),
    };
    let app: Router = routes::build_router(build_cors(), state, Some(images_dir));

    // Bind and serve
    let addr = load_bind_addr(&cfg.server)?;
    info!(%addr, "starting bookdrop server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
