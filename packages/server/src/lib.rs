#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the election map application.
//!
//! Serves the normalized region dataset as GeoJSON for the map frontend,
//! and the editorial API used by the newsroom to draft, review, and publish
//! election coverage. The region dataset is built once before the server
//! binds and is shared read-only by every worker. Articles and accounts
//! live in a `SQLite` database at `data/editorial.db` by default.

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use election_map_auth::IdentityProvider;
use election_map_auth::local::{DEFAULT_SESSION_TTL_HOURS, LocalIdentityProvider};
use election_map_editorial::service::{ArticleService, DEFAULT_STORE_TIMEOUT};
use election_map_editorial::store::{self, EditorialStore, StoreError};
use election_map_region::RegionDataset;
use election_map_region::load::{DEFAULT_REGIONS_PATH, build_dataset};
use rand::SeedableRng as _;
use rand::rngs::StdRng;

/// Startup configuration, read from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `BIND_ADDR`, default `127.0.0.1`.
    pub bind_addr: String,
    /// `PORT`, default `8080`.
    pub port: u16,
    /// `REGIONS_PATH`, default `data/regions.geojson`.
    pub regions_path: PathBuf,
    /// `EDITORIAL_DB_PATH`, default `data/editorial.db`. `:memory:` selects
    /// a volatile store.
    pub editorial_db: String,
    /// `STATS_SEED`. When unset, synthesized statistics differ per run.
    pub stats_seed: Option<u64>,
    /// `SESSION_TTL_HOURS`, default 12.
    pub session_ttl: chrono::Duration,
    /// `STORE_TIMEOUT_SECS`, default 10.
    pub store_timeout: Duration,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unset or unparsable
    /// values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "PORT").unwrap_or(8080),
            regions_path: lookup("REGIONS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_REGIONS_PATH), PathBuf::from),
            editorial_db: lookup("EDITORIAL_DB_PATH")
                .unwrap_or_else(|| store::sqlite::DEFAULT_DB_PATH.to_string()),
            stats_seed: parse_var(&lookup, "STATS_SEED"),
            session_ttl: chrono::Duration::hours(
                parse_var(&lookup, "SESSION_TTL_HOURS").unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            ),
            store_timeout: parse_var(&lookup, "STORE_TIMEOUT_SECS")
                .map_or(DEFAULT_STORE_TIMEOUT, Duration::from_secs),
        }
    }
}

/// Parses the variable `key`, warning when it is set but unparsable.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let value = lookup(key)?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring unparsable {key}={value}");
    }
    parsed
}

/// Shared application state.
pub struct AppState {
    /// Normalized regions with election statistics. Never mutated.
    pub regions: Arc<RegionDataset>,
    /// Editorial operations.
    pub articles: ArticleService,
    /// Account and session management.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Builds the state from its parts.
    #[must_use]
    pub fn new(
        regions: RegionDataset,
        articles: ArticleService,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            regions: Arc::new(regions),
            articles,
            identity,
        }
    }

    /// Loads the region dataset and opens the editorial store described by
    /// `config`.
    ///
    /// A missing or malformed region file does not fail startup; the
    /// fallback dataset is served instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the editorial store cannot be opened.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let regions = match config.stats_seed {
            Some(seed) => {
                log::info!("Synthesizing statistics with seed {seed}");
                build_dataset(&config.regions_path, &mut StdRng::seed_from_u64(seed))
            }
            None => build_dataset(&config.regions_path, &mut rand::rng()),
        };

        let store: Arc<dyn EditorialStore> = store::open(&config.editorial_db).await?;

        let articles =
            ArticleService::new(store.clone()).with_store_timeout(config.store_timeout);
        let identity = LocalIdentityProvider::new(store)
            .with_session_ttl(config.session_ttl)
            .with_store_timeout(config.store_timeout);

        Ok(Self::new(regions, articles, Arc::new(identity)))
    }
}

/// Registers the `/api` routes and JSON extractor settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        )
        .into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        )
        .into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/regions", web::get().to(handlers::regions))
            .route("/auth/register", web::post().to(handlers::register))
            .route("/auth/login", web::post().to(handlers::login))
            .route("/articles", web::get().to(handlers::list_articles))
            .route("/articles", web::post().to(handlers::create_article))
            .route("/articles/{id}", web::put().to(handlers::update_article))
            .route(
                "/articles/{id}/transition",
                web::post().to(handlers::transition_article),
            ),
    );
}

/// Starts the election map API server.
///
/// Reads [`ServerConfig`] from the environment, builds the region dataset,
/// opens the editorial store, and starts the Actix-Web HTTP server. The
/// caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the editorial store cannot be
/// opened, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    let state = web::Data::new(
        AppState::from_config(&config)
            .await
            .map_err(std::io::Error::other)?,
    );

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
