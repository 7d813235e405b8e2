use crate::handlers;
use crate::static_handler::StaticHandler;
use crate::table::Table;
use std::convert::Infallible;
use std::error::Error as _;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::{Reply, Response};
use warp::Filter;

/// Where to listen, what to serve, and how to shuffle.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    static_dir: PathBuf,
    seed: Option<u64>,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            static_dir: static_dir.into(),
            seed: None,
        }
    }

    /// Fixes the shuffle seed; `None` seeds from the OS.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Ephemeral port on loopback, a scratch static dir, seed 7.
    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0, std::env::temp_dir().join("gang_web_static"))
            .with_seed(Some(7))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let target = format!("{}:{}", self.host, self.port);
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| ServerError::ConfigError(format!("cannot resolve `{target}`: {err}")))?
            .next()
            .ok_or_else(|| ServerError::ConfigError(format!("`{target}` resolved to nothing")))
    }
}

/// The one table and the static client, shared by every route.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    table: Arc<Table>,
    static_handler: Arc<StaticHandler>,
}

impl AppContext {
    /// Builds the shared state, creating the static directory if it is
    /// missing so the server can start before the client is built.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        std::fs::create_dir_all(config.static_dir()).map_err(|err| {
            ServerError::ConfigError(format!(
                "cannot create static dir {}: {err}",
                config.static_dir().display()
            ))
        })?;

        Ok(Self {
            table: Arc::new(Table::with_seed(config.seed())),
            static_handler: Arc::new(StaticHandler::new(config.static_dir())),
            config,
        })
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests()).expect("test context")
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }

    pub fn static_handler(&self) -> Arc<StaticHandler> {
        Arc::clone(&self.static_handler)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        Ok(Self {
            context: AppContext::new(config)?,
        })
    }

    /// Binds and serves in a background task until the returned handle is
    /// shut down or dropped.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let config = self.context.config();
        let requested = config.socket_addr()?;

        // warp hides the io error of a failed bind inside hyper's, so an
        // occupied fixed port is detected here first.
        if requested.port() != 0 {
            drop(TcpListener::bind(requested)?);
        }

        let (stop, stopped) = oneshot::channel::<()>();
        let (addr, serving) = warp::serve(routes(&self.context))
            .try_bind_with_graceful_shutdown(requested, async move {
                let _ = stopped.await;
            })
            .map_err(bind_failure)?;

        tracing::info!(
            address = %addr,
            static_dir = %config.static_dir().display(),
            seeded = config.seed().is_some(),
            "web server listening"
        );

        Ok(ServerHandle {
            addr,
            stop: Some(stop),
            serving: Some(tokio::spawn(serving)),
        })
    }
}

fn bind_failure(err: warp::Error) -> ServerError {
    match err.source().and_then(|source| source.downcast_ref::<io::Error>()) {
        Some(io_err) => ServerError::BindError(io::Error::new(io_err.kind(), io_err.to_string())),
        None => ServerError::ConfigError(err.to_string()),
    }
}

/// Every route the server answers, in match order: health, the state API,
/// the socket upgrade, then the static client with its fallback.
pub fn routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    health_route()
        .or(api_routes(context))
        .unify()
        .or(ws_route(context))
        .unify()
        .or(static_routes(context))
        .unify()
        .boxed()
}

fn health_route() -> BoxedFilter<(Response,)> {
    warp::path("health")
        .and(warp::get())
        .and(warp::path::end())
        .map(|| handlers::health().into_response())
        .boxed()
}

fn api_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "state")
        .and(warp::get())
        .and(shared(context.table()))
        .then(handlers::table_state)
        .boxed()
}

fn ws_route(context: &AppContext) -> BoxedFilter<(Response,)> {
    warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(shared(context.table()))
        .map(handlers::upgrade)
        .boxed()
}

fn static_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    warp::get()
        .and(warp::path::tail())
        .and(shared(context.static_handler()))
        .then(|tail: warp::path::Tail, handler: Arc<StaticHandler>| async move {
            handler.serve(tail.as_str()).await
        })
        .boxed()
}

/// Hands a clone of `value` to each request.
fn shared<T>(value: Arc<T>) -> impl Filter<Extract = (Arc<T>,), Error = Infallible> + Clone
where
    T: Send + Sync + 'static,
{
    warp::any().map(move || Arc::clone(&value))
}

/// A running server. Dropping it stops the server without waiting.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    serving: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits for open ones to finish.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(serving) = self.serving.take() {
            serving
                .await
                .map_err(|err| ServerError::ConfigError(format!("server task failed: {err}")))?;
        }

        tracing::info!(address = %self.addr, "web server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(serving) = self.serving.take() {
            serving.abort();
        }
    }
}
