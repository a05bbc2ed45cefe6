use std::sync::Arc;

use course_dash::api::HttpBackend;
use course_dash::config::ClientConfig;
use course_dash::models::SessionPhase;
use course_dash::{Engine, EngineOptions};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_dash=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::new_from_env()?;
    let backend = Arc::new(HttpBackend::new(&config.base_url, config.timeout)?);
    let engine = Engine::new(backend, EngineOptions::from(&config));

    let mut updates = engine.store().subscribe();
    engine.start().await;

    let session = engine.store().snapshot().session;
    if session.phase() == SessionPhase::Anonymous {
        match &config.credentials {
            Some(credentials) => {
                if let Err(e) = engine.session.login(credentials).await {
                    warn!("Login failed: {}", e);
                }
            }
            None => warn!("Not signed in and no DASH_USER/DASH_PASSWORD configured"),
        }
    }

    let session = engine.store().snapshot().session;
    if session.user_authenticated && !session.browser_authenticated {
        info!("Not logged into the registration site, attempting browser login");
        if let Err(e) = engine.session.browser_login().await {
            warn!("Browser login failed: {}", e);
        }
    }

    info!("Watching course roster, press Ctrl-C to exit");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                let now = chrono::Local::now().time();
                info!(
                    "{:?}: tracking {} courses{} | {}",
                    state.session.phase(),
                    state.courses.len(),
                    if state.courses_loading { " (loading)" } else { "" },
                    if engine.is_running(now) { "running" } else { "not running" },
                );
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    engine.stop();
    Ok(())
}
