//! pixfeed server and loader CLI.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pixfeed_kernel::backend::{Backend, MemoryBackend, Session};
use pixfeed_kernel::metrics::Metrics;
use pixfeed_kernel::{AppState, Config, build_router, demo, feed};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use the in-memory backend with sample data instead of PocketBase.
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Run one page loader and print its JSON.
    Load {
        page: Page,

        /// Username for `user`, post id for `post`.
        target: Option<String>,

        /// Backend auth token; a user id with --demo.
        #[arg(long, env = "PIXFEED_TOKEN")]
        token: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Page {
    Session,
    Home,
    Profile,
    User,
    Post,
    Notifications,
    Badge,
    Followers,
    Following,
    Requests,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, cli.demo).await,
        Command::Load {
            page,
            target,
            token,
        } => {
            let state = build_state(&config, cli.demo)?;
            let session = state
                .backend()
                .session(token.as_deref())
                .await
                .context("failed to resolve session")?;
            let json = load(page, target.as_deref(), &session).await?;
            println!("{json}");
            Ok(())
        }
    }
}

fn build_state(config: &Config, demo_mode: bool) -> Result<AppState> {
    if !demo_mode {
        return AppState::new(config).context("failed to initialize application state");
    }

    let backend = MemoryBackend::new();
    demo::seed(&backend).context("failed to seed demo data")?;
    info!("Using in-memory backend with demo data");
    Ok(AppState::with_backend(
        Arc::new(backend),
        Arc::new(Metrics::new()),
    ))
}

async fn serve(config: &Config, demo_mode: bool) -> Result<()> {
    info!("Starting pixfeed");
    info!(port = config.port, "Configuration loaded");

    let state = build_state(config, demo_mode)?;
    if !state.backend().healthy().await {
        warn!(backend = state.backend().kind(), "backend not reachable at startup");
    }

    let cors = build_cors_layer(config);

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn load(page: Page, target: Option<&str>, session: &Session) -> Result<String> {
    fn render<T: Serialize>(value: &T) -> Result<String> {
        serde_json::to_string_pretty(value).context("failed to encode loader output")
    }

    match page {
        Page::Session => render(&feed::load_session(session)),
        Page::Home => render(&feed::load_home(session).await?),
        Page::Profile => render(&feed::load_own_profile(session).await?),
        Page::User => {
            let Some(username) = target else {
                bail!("`load user` needs a username");
            };
            render(&feed::load_user_profile(session, username).await?)
        }
        Page::Post => {
            let Some(id) = target else {
                bail!("`load post` needs a post id");
            };
            match feed::load_post(session, id).await {
                Some(post_page) => render(&post_page),
                None => bail!("post {id} not found"),
            }
        }
        Page::Notifications => {
            let notifications = feed::load_notifications(session).await?;
            render(&notifications.timeline())
        }
        Page::Badge => render(&feed::load_notification_badge(session).await?),
        Page::Followers => render(&feed::load_followers(session).await?),
        Page::Following => render(&feed::load_following(session).await?),
        Page::Requests => render(&feed::load_requests(session).await?),
    }
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_allows_any() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
