//! Main entry point for CLI command to start server.

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use tracing_subscriber::EnvFilter;

use crate::configuration::Configuration;
use crate::configuration::generate_config_schema;
use crate::router::BlogGraphServer;
use crate::router::ShutdownSource;
use crate::schema::build_schema;
use crate::store::FixtureStore;

/// Subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration subcommands.
    Config(ConfigSubcommandArgs),

    /// Print the GraphQL schema definition and exit.
    Sdl,
}

#[derive(Args, Debug)]
struct ConfigSubcommandArgs {
    /// Subcommands
    #[clap(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommand {
    /// Print the json configuration schema.
    Schema,

    /// Check a configuration file for errors.
    Validate {
        /// The location of the config to validate.
        #[clap(value_parser)]
        config_path: PathBuf,
    },
}

/// Options for the server
#[derive(Parser, Debug)]
#[clap(name = "blog-graph", about = "GraphQL API over users, posts and comments", version)]
pub(crate) struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[clap(
        long = "log",
        default_value = "info",
        alias = "log-level",
        env = "BLOG_GRAPH_LOG"
    )]
    log_level: String,

    /// Configuration location relative to the project directory.
    #[clap(short, long = "config", env = "BLOG_GRAPH_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Address to listen on, overrides `graphql.listen` from the configuration.
    #[clap(long, env = "BLOG_GRAPH_LISTEN")]
    listen: Option<SocketAddr>,

    #[clap(subcommand)]
    command: Option<Commands>,
}

/// This is the main entrypoint.
pub fn main() -> Result<()> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(nb) = worker_threads(std::env::var("BLOG_GRAPH_NUM_CORES").ok().as_deref()) {
        builder.worker_threads(nb);
    }
    let runtime = builder.build()?;
    runtime.block_on(Executable::builder().start())
}

/// tokio panics on zero worker threads, so zero falls back to the default.
fn worker_threads(num_cores: Option<&str>) -> Option<usize> {
    num_cores
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|nb| *nb > 0)
}

/// Entry point into creating a server executable.
pub struct Executable {}

#[buildstructor::buildstructor]
impl Executable {
    /// Build an executable that will parse commandline options and set up logging.
    ///
    /// Note that if you do not specify a runtime you must be in the context of an existing tokio runtime.
    #[builder(entry = "builder", exit = "start")]
    pub async fn start(shutdown: Option<ShutdownSource>) -> Result<()> {
        let opt = Opt::parse();

        match opt.command {
            Some(Commands::Config(ConfigSubcommandArgs {
                command: ConfigSubcommand::Schema,
            })) => {
                let schema = generate_config_schema();
                println!("{}", serde_json::to_string_pretty(&schema)?);
                return Ok(());
            }
            Some(Commands::Config(ConfigSubcommandArgs {
                command: ConfigSubcommand::Validate { config_path },
            })) => {
                Configuration::from_file(&config_path)?;
                println!("Configuration at path {:?} is valid!", config_path);
                return Ok(());
            }
            Some(Commands::Sdl) => {
                let schema = build_schema(FixtureStore::demo(), &Configuration::default());
                println!("{}", schema.sdl());
                return Ok(());
            }
            None => {}
        }

        init_subscriber(&opt.log_level)?;
        setup_panic_handler();

        let configuration = load_configuration(opt.config_path, opt.listen)?;

        let server = BlogGraphServer::builder()
            .configuration(configuration)
            .store(FixtureStore::demo())
            .shutdown(shutdown.unwrap_or(ShutdownSource::CtrlC))
            .build();
        if let Err(err) = server.serve().await {
            tracing::error!("{}", err);
            return Err(err.into());
        }
        Ok(())
    }
}

fn load_configuration(
    config_path: Option<PathBuf>,
    listen: Option<SocketAddr>,
) -> Result<Configuration> {
    let configuration = match config_path {
        Some(path) => {
            let path = if path.is_relative() {
                std::env::current_dir()?.join(path)
            } else {
                path
            };
            tracing::debug!("loading configuration from {}", path.display());
            Configuration::from_file(&path)
                .with_context(|| format!("could not load configuration from {}", path.display()))?
        }
        None => Configuration::default(),
    };

    Ok(match listen {
        Some(listen) => configuration.with_listen(listen),
        None => configuration,
    })
}

fn init_subscriber(log_level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt::fmt().with_env_filter(
        EnvFilter::try_new(log_level).context("could not parse log configuration")?,
    );

    // We choose json or plain based on tty
    if std::io::stdout().is_terminal() {
        builder
            .try_init()
            .map_err(|err| anyhow!("could not set global subscriber: {err}"))
    } else {
        builder
            .json()
            .try_init()
            .map_err(|err| anyhow!("could not set global subscriber: {err}"))
    }
}

fn setup_panic_handler() {
    // Redirect panics to the logs.
    let backtrace_env = std::env::var("RUST_BACKTRACE");
    let show_backtraces =
        backtrace_env.as_deref() == Ok("1") || backtrace_env.as_deref() == Ok("full");
    std::panic::set_hook(Box::new(move |e| {
        if show_backtraces {
            let backtrace = std::backtrace::Backtrace::force_capture();
            tracing::error!("{}\n{}", e, backtrace)
        } else {
            tracing::error!("{}", e)
        }
    }));
}
