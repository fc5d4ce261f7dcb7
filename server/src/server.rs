//! Router assembly and the server entry point.

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{self, Method},
    routing::{get, post},
};
use lectern_core::{ChatModel, EmbeddingModel};
use lectern_openai::OpenAi;
use lectern_rag::{Engine, IndexHandle, RagConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::handlers::{ask, health};

/// Builds the application router around an engine.
pub struct AppBuilder {
    app: Router,
}

impl std::fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBuilder").finish_non_exhaustive()
    }
}

impl AppBuilder {
    /// Creates the router with the query and health routes.
    pub fn new<M, G>(engine: Engine<M, G>) -> Self
    where
        M: EmbeddingModel + 'static,
        G: ChatModel + 'static,
    {
        let app = Router::new()
            .route("/api/", post(ask::<M, G>))
            .route("/health", get(health::<M, G>))
            .with_state(engine);
        Self { app }
    }

    /// Adds HTTP request tracing.
    #[must_use]
    pub fn with_trace_layer(self) -> Self {
        Self {
            app: self.app.layer(TraceLayer::new_for_http()),
        }
    }

    /// Adds a CORS layer: permissive in debug builds, GET/POST from any
    /// origin otherwise.
    #[must_use]
    pub fn with_cors_layer(self) -> Self {
        let cors_layer = if cfg!(debug_assertions) {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([http::header::CONTENT_TYPE])
                .allow_origin(AllowOrigin::any())
        };
        Self {
            app: self.app.layer(cors_layer),
        }
    }

    /// Returns the assembled router.
    #[must_use]
    pub fn build(self) -> Router {
        self.app
    }
}

/// The running server: a verified engine plus a bind address.
#[derive(Debug)]
pub struct Server {
    engine: Engine<OpenAi, OpenAi>,
    address: String,
}

impl Server {
    /// Loads and verifies the index unit, then constructs the engine.
    ///
    /// Any failure here (absent artifacts, corrupt header, misaligned
    /// rows, missing API key, dimension mismatch) aborts startup.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let handle = IndexHandle::load(&config.index_dir).with_context(|| {
            format!("loading index unit from {}", config.index_dir.display())
        })?;

        let mut client = OpenAi::from_env()?;
        if config.api_base.is_some() || config.chat_model.is_some() {
            client = rebuild_client(&client, &config);
        }

        let rag_config = RagConfig::builder().top_k(config.top_k).build();
        let engine = Engine::new(client.clone(), client, Arc::new(handle), rag_config)
            .context("engine construction failed")?;

        Ok(Self {
            engine,
            address: config.address,
        })
    }

    /// Binds the listener and serves until shutdown.
    pub async fn run(self) -> Result<()> {
        let app = AppBuilder::new(self.engine)
            .with_trace_layer()
            .with_cors_layer()
            .build();

        tracing::info!(address = %self.address, "listening");
        let listener = TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("binding {}", self.address))?;
        axum::serve(listener, app).await.context("server error")
    }
}

fn rebuild_client(client: &OpenAi, config: &ServerConfig) -> OpenAi {
    let mut openai_config = client.config().clone();
    if let Some(base) = &config.api_base {
        openai_config = openai_config.with_api_base(base.clone());
    }
    if let Some(model) = &config.chat_model {
        openai_config = openai_config.with_chat_model(model.clone());
    }
    OpenAi::new(openai_config)
}
