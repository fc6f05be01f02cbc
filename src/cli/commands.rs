//! CLI command implementations
//!
//! `serve` boots the HTTP server; `validate` loads the configuration,
//! reports problems, and exits. Seeding runs before the listener binds
//! so a fixture-backed server never answers with a half-loaded store.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tokio::net::TcpListener;

use crate::auth::password::hash_password;
use crate::config::AppConfig;
use crate::http::{app, AppState};
use crate::models::{Booking, Resource, Review, Tour, User};
use crate::store::Collection;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Dispatch the parsed command line
pub async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Serve { config, port, seed } => serve(&config, port, seed.as_deref()).await,
        Command::Validate { config } => validate(&config),
    }
}

async fn serve(config_path: &Path, port: Option<u16>, seed: Option<&Path>) -> CliResult<()> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }

    let addr = format!("{}:{}", config.host, config.port);
    let env = config.env;
    let state = AppState::new(config);

    if let Some(fixture) = seed {
        let counts = seed_store(&state, fixture)?;
        tracing::info!(docs = counts, fixture = %fixture.display(), "store seeded");
    }

    let router = app::build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %env, "tourbase listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn validate(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    println!("configuration OK ({} mode, {}:{})", config.env, config.host, config.port);
    Ok(())
}

/// Load a JSON fixture into the store
///
/// The fixture is an object keyed by collection name, each value an
/// array of documents. User documents may carry a plaintext `password`
/// which is hashed on the way in.
pub fn seed_store(state: &AppState, path: &Path) -> CliResult<usize> {
    let raw = fs::read_to_string(path)?;
    let fixture: Value =
        serde_json::from_str(&raw).map_err(|e| CliError::Seed(format!("invalid fixture JSON: {}", e)))?;
    let sections = fixture
        .as_object()
        .ok_or_else(|| CliError::Seed("fixture root must be an object".to_string()))?;

    let mut total = 0;
    for (name, docs) in sections {
        let docs = docs
            .as_array()
            .ok_or_else(|| CliError::Seed(format!("section '{}' must be an array", name)))?;
        // Section names are checked before any document is touched, so an
        // unknown (even empty) section always rejects the fixture.
        total += match name.as_str() {
            "tours" => seed_section::<Tour>(&state.store.tours, docs)?,
            "users" => seed_users(&state.store.users, docs)?,
            "reviews" => seed_section::<Review>(&state.store.reviews, docs)?,
            "bookings" => seed_section::<Booking>(&state.store.bookings, docs)?,
            other => return Err(CliError::Seed(format!("unknown section '{}'", other))),
        };
    }
    Ok(total)
}

fn seed_section<R: Resource>(collection: &Collection, docs: &[Value]) -> CliResult<usize> {
    for doc in docs {
        seed_doc::<R>(collection, doc.clone())?;
    }
    Ok(docs.len())
}

fn seed_users(collection: &Collection, docs: &[Value]) -> CliResult<usize> {
    for doc in docs {
        seed_doc::<User>(collection, prepare_user(doc.clone())?)?;
    }
    Ok(docs.len())
}

fn seed_doc<R: Resource>(collection: &Collection, mut doc: Value) -> CliResult<()> {
    R::apply_defaults(&mut doc);
    R::validate(&doc)
        .map_err(|problems| CliError::Seed(format!("invalid document: {}", problems.join("; "))))?;
    collection
        .insert(doc)
        .map_err(|e| CliError::Seed(e.to_string()))?;
    Ok(())
}

fn prepare_user(mut doc: Value) -> CliResult<Value> {
    if let Some(fields) = doc.as_object_mut() {
        if let Some(password) = fields.remove("password") {
            let password = password
                .as_str()
                .ok_or_else(|| CliError::Seed("user password must be a string".to_string()))?;
            let hash = hash_password(password).map_err(|e| CliError::Seed(e.to_string()))?;
            fields.insert("password_hash".to_string(), Value::String(hash));
        }
    }
    Ok(doc)
}
