//! Registrar HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, signing keys, and the HTTP router, then
//! starts the API server and the metrics listener.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup
//! logic.
mod api;
mod app;
mod attendance;
mod auth;
mod config;
mod model;
mod observability;
mod registration;
mod store;

use app::{AppState, build_router};
use auth::password::hash_password;
use auth::token::TokenKeys;
use config::{BootstrapAdmin, RegistrarConfig};
use model::{Identity, Role, normalize_email};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use store::{RegistrarStore, StoreError, memory::InMemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing or malformed token seed fails here, before anything binds.
    let config = RegistrarConfig::from_env_or_yaml().expect("registrar config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: RegistrarConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability();
    let state = build_state(&config).await?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "registrar listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: &RegistrarConfig) -> anyhow::Result<AppState> {
    let keys = TokenKeys::from_seed(&config.token_seed)
        .map_err(|err| anyhow::anyhow!("build token keys: {err}"))?;
    let store: Arc<dyn RegistrarStore + Send + Sync> = Arc::new(InMemoryStore::new());
    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(store.as_ref(), admin).await?;
    }
    Ok(AppState {
        store,
        keys: Arc::new(keys),
        token_ttl: Duration::from_secs(config.token_ttl_secs),
        api_version: "v1".to_string(),
    })
}

/// Find-or-create the configured bootstrap admin identity.
async fn seed_admin(store: &dyn RegistrarStore, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let email = normalize_email(&admin.email);
    if store.find_identity(&email).await?.is_some() {
        return Ok(());
    }
    let hash = hash_password(&admin.password)?;
    match store
        .create_identity(Identity {
            email: email.clone(),
            display_name: "Administrator".to_string(),
            password_hash: hash,
            role: Role::Admin,
            profile_image: None,
            preferences: serde_json::json!({}),
        })
        .await
    {
        Ok(_) => {
            tracing::info!(%email, "bootstrap admin created");
            Ok(())
        }
        // Lost a race with another seeding path; the identity exists.
        Err(StoreError::Conflict(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
