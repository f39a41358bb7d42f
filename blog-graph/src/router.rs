//! The blog-graph HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use derivative::Derivative;
use derive_more::Display;
use futures::FutureExt;
use futures::future;
use tokio::net::TcpListener;

use crate::axum_factory::main_router;
use crate::configuration::Configuration;
use crate::error::ServerError;
use crate::schema::build_schema;
use crate::store::FixtureStore;

type ShutdownFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Specifies when the server should gracefully shutdown
#[derive(Display, Derivative)]
#[derivative(Debug)]
#[non_exhaustive]
pub enum ShutdownSource {
    /// No graceful shutdown
    #[display("None")]
    None,

    /// A custom shutdown future.
    #[display("Custom")]
    Custom(#[derivative(Debug = "ignore")] ShutdownFuture),

    /// Watch for Ctl-C signal.
    #[display("CtrlC")]
    CtrlC,
}

impl ShutdownSource {
    /// Convert this shutdown hook into a future. Allows for unified handling later.
    fn into_signal(self) -> ShutdownFuture {
        match self {
            ShutdownSource::None => future::pending::<()>().boxed(),
            ShutdownSource::Custom(future) => future,
            ShutdownSource::CtrlC => async {
                let ctrl_c = async {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::error!("failed to install CTRL+C signal handler: {err}");
                        future::pending::<()>().await;
                    }
                };

                #[cfg(unix)]
                let terminate = async {
                    use tokio::signal::unix::SignalKind;
                    use tokio::signal::unix::signal;

                    match signal(SignalKind::terminate()) {
                        Ok(mut terminate) => {
                            terminate.recv().await;
                        }
                        Err(err) => {
                            tracing::error!("failed to install SIGTERM signal handler: {err}");
                            future::pending::<()>().await;
                        }
                    }
                };

                #[cfg(not(unix))]
                let terminate = future::pending::<()>();

                tokio::select! {
                    _ = ctrl_c => {},
                    _ = terminate => {},
                }
            }
            .boxed(),
        }
    }
}

/// Serves the fixture graph over HTTP.
///
/// ```no_run
/// use blog_graph::BlogGraphServer;
/// use blog_graph::ShutdownSource;
/// # #[tokio::main]
/// # async fn main() -> Result<(), blog_graph::error::ServerError> {
/// BlogGraphServer::builder()
///     .shutdown(ShutdownSource::CtrlC)
///     .build()
///     .serve()
///     .await
/// # }
/// ```
#[derive(Debug)]
pub struct BlogGraphServer {
    configuration: Configuration,
    store: FixtureStore,
    shutdown: ShutdownSource,
}

#[buildstructor::buildstructor]
impl BlogGraphServer {
    /// Build a server. The demonstration fixtures are served unless a store is
    /// supplied.
    #[builder]
    pub fn new(
        configuration: Option<Configuration>,
        store: Option<FixtureStore>,
        shutdown: Option<ShutdownSource>,
    ) -> Self {
        Self {
            configuration: configuration.unwrap_or_default(),
            store: store.unwrap_or_else(FixtureStore::demo),
            shutdown: shutdown.unwrap_or(ShutdownSource::CtrlC),
        }
    }

    /// Bind the listener without serving yet.
    pub async fn bind(self) -> Result<ListeningServer, ServerError> {
        let schema = build_schema(self.store, &self.configuration);
        let router = main_router(&self.configuration, schema)?;

        let address = self.configuration.graphql().listen();
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { address, source })?;

        Ok(ListeningServer {
            listener,
            local_addr,
            router,
            shutdown: self.shutdown,
        })
    }

    /// Bind and serve until the shutdown source fires.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.bind().await?.serve().await
    }
}

/// A server whose listener is bound.
#[derive(Debug)]
pub struct ListeningServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: axum::Router,
    shutdown: ShutdownSource,
}

impl ListeningServer {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn serve(self) -> Result<(), ServerError> {
        tracing::info!("server is up & running on {}", self.local_addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(self.shutdown.into_signal())
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("stopped");
        Ok(())
    }
}
