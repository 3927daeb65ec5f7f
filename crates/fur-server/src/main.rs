use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Parser;
use cli::{Args, Commands};
use fur_config::{
    config::{self, generate_default_config, Config},
    error::ConfigError,
};
use fur_registry::{
    seed,
    store::FsDescriptorStore,
    validate::validate,
    Descriptor, Registry,
};
use fur_server::{routes, state::AppState};
use fur_utils::path::resolve_path;
use logging::setup_logging;
use miette::{Context, IntoDiagnostic};
use tracing::{debug, info, warn};

mod cli;
mod logging;

/// Seed list for an empty store, if seeding is enabled.
fn seed_for(config: &Config) -> miette::Result<Option<Vec<Descriptor>>> {
    if !config.seed_defaults() {
        return Ok(None);
    }

    let seed = match config.get_seed_path()? {
        Some(path) => {
            debug!(path = %path.display(), "using seed file");
            seed::load_seed_file(&path)?
        }
        None => seed::bundled()?,
    };
    Ok(Some(seed))
}

/// Command-line settings that take precedence over the configuration.
struct ServeOverrides {
    bind: Option<SocketAddr>,
    projects: Option<PathBuf>,
    no_seed: bool,
}

impl ServeOverrides {
    fn parse(
        bind: Option<String>,
        projects: Option<String>,
        no_seed: bool,
    ) -> miette::Result<Self> {
        let bind = bind
            .map(|raw| {
                raw.trim()
                    .parse::<SocketAddr>()
                    .map_err(|_| ConfigError::InvalidBindAddress(raw))
            })
            .transpose()?;
        let projects = projects
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)?;

        Ok(Self {
            bind,
            projects,
            no_seed,
        })
    }
}

fn open_registry(config: &Config, overrides: &ServeOverrides) -> miette::Result<Registry> {
    let projects = match &overrides.projects {
        Some(path) => path.clone(),
        None => config.get_projects_path()?,
    };
    let seed = if overrides.no_seed {
        None
    } else {
        seed_for(config)?
    };

    let store = FsDescriptorStore::open(&projects)?;
    info!(path = %projects.display(), "opening registry");

    Ok(Registry::open(Arc::new(store), seed)?)
}

async fn serve(config: Config, overrides: ServeOverrides) -> miette::Result<()> {
    let addr = match overrides.bind {
        Some(addr) => addr,
        None => config.bind_address()?,
    };

    let registry = tokio::task::spawn_blocking({
        let config = config.clone();
        move || open_registry(&config, &overrides)
    })
    .await
    .into_diagnostic()??;

    let state = Arc::new(AppState::new(registry, &config));
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("binding {addr}"))?;
    info!(%addr, "registry listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("registry stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

fn validate_file(path: &Path) -> miette::Result<()> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    let payload = serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("parsing {}", path.display()))?;

    let descriptor = validate(&payload)?;
    info!("{} {} is a valid furconfig", descriptor.name, descriptor.version);
    Ok(())
}

async fn handle_cli() -> miette::Result<()> {
    let args = Args::parse();

    if let Some(ref c) = args.config {
        let path = resolve_path(c).map_err(ConfigError::from)?;
        config::set_config_path(path);
    }

    if let Commands::DefConfig = args.command {
        setup_logging(&args, config::DEFAULT_LOG_LEVEL, false);
        generate_default_config()?;
        return Ok(());
    }

    let config = Config::new()?;
    setup_logging(&args, &config.log_level(), config.log_json());
    debug!(path = %config::config_path().display(), "configuration loaded");

    match args.command {
        Commands::Serve {
            bind,
            projects,
            no_seed,
        } => {
            let overrides = ServeOverrides::parse(bind, projects, no_seed)?;
            serve(config, overrides).await?;
        }
        Commands::Validate {
            file,
        } => validate_file(&file)?,
        Commands::Config => {
            let doc = config.to_annotated_document()?;
            print!("{doc}");
        }
        Commands::DefConfig => unreachable!(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(report) = handle_cli().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}
