use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod auth;
mod calc;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod utils;

use config::{Config, StoreBackend};
use db::{init_db, run_migrations};

use crate::docs::ApiDoc;
use crate::model::department::Department;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::mysql::MySqlStore;
use crate::utils::department_cache;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HR payroll service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, backend = ?config.store_backend, "Server starting...");

    let stores = match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = init_db(url).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }

            let pool_for_cache_warmup = pool.clone();
            actix_web::rt::spawn(async move {
                if let Err(e) =
                    department_cache::warmup_department_cache(&pool_for_cache_warmup, 250).await
                {
                    warn!(error = ?e, "Failed to warmup department cache");
                }
            });

            MySqlStore::stores(pool).await?
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            MemoryStore::with_departments(vec![Department {
                id: 1,
                name: "General".into(),
            }])
            .stores()
        }
    };

    let state = AppState::new(stores, config.rules.clone(), config.write_guard);
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(state.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // Protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
