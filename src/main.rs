use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use zmng::api::ZmApi;
use zmng::config::{AppConfig, DEFAULT_PROBE_TIMEOUT_SECS};
use zmng::discovery::{DiscoveryEngine, DiscoveryOptions};
use zmng::http::ReqwestTransport;
use zmng::streaming::{StreamMode, StreamRequest, stream_url};
use zmng::types::ServerEndpoints;

#[derive(Parser, Debug)]
#[command(
    name = "zmng",
    version,
    about = "ZoneMinder server discovery and addressing"
)]
struct Cli {
    /// Path to zmng.toml
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe a server and print its resolved endpoint URLs
    Discover {
        #[command(flatten)]
        target: Target,
    },
    /// Print the server's reported version
    Version {
        #[command(flatten)]
        target: Target,
    },
    /// Print a monitor's stream URL
    StreamUrl {
        #[command(flatten)]
        target: Target,
        /// Monitor id to stream
        #[arg(long)]
        monitor: u32,
        #[arg(long, value_enum, default_value_t = ModeArg::Jpeg)]
        mode: ModeArg,
        #[arg(long)]
        scale: Option<u32>,
        #[arg(long)]
        maxfps: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Host, host:port, or full URL to probe
    input: Option<String>,
    /// Named server profile from the configuration file
    #[arg(long, conflicts_with = "input")]
    server: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    pass: Option<String>,
    /// Per-probe timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Jpeg,
    Single,
}

impl From<ModeArg> for StreamMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Jpeg => StreamMode::Jpeg,
            ModeArg::Single => StreamMode::Single,
        }
    }
}

struct ResolvedTarget {
    input: String,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    debug!(config = ?cli.config, "CLI arguments parsed");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received; cancelling");
                cancel.cancel();
            }
        });
    }

    let transport = Arc::new(ReqwestTransport::new());
    match cli.command {
        Command::Discover { target } => {
            let resolved = resolve_target(&target, cli.config.as_deref())?;
            let endpoints = discover(&transport, &resolved, cancel).await?;
            println!("{}", serde_json::to_string_pretty(&endpoints)?);
        }
        Command::Version { target } => {
            let resolved = resolve_target(&target, cli.config.as_deref())?;
            let endpoints = discover(&transport, &resolved, cancel).await?;
            let api = ZmApi::new(transport.clone(), endpoints.api_url, resolved.timeout);
            println!("{}", api.version().await?);
        }
        Command::StreamUrl {
            target,
            monitor,
            mode,
            scale,
            maxfps,
        } => {
            let resolved = resolve_target(&target, cli.config.as_deref())?;
            let endpoints = discover(&transport, &resolved, cancel).await?;
            let mut request = StreamRequest::new(monitor).with_mode(mode.into());
            request.scale = scale;
            request.maxfps = maxfps;
            if let Some(token) = stream_token(&transport, &endpoints, &resolved).await {
                request = request.with_token(token);
            }
            println!("{}", stream_url(&endpoints.cgi_url, &request));
        }
    }
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

/// Turn CLI arguments into one discovery target, pulling host and
/// credentials from the named profile when `--server` is used. Explicit
/// flags win over profile values.
fn resolve_target(target: &Target, config_path: Option<&str>) -> Result<ResolvedTarget, Box<dyn Error>> {
    if let Some(name) = &target.server {
        let config = AppConfig::load(config_path.map(Path::new))?;
        let profile = config.server(name)?.clone();
        info!(server = name.as_str(), host = profile.host.as_str(), "Using configured server profile");
        let profile_password = profile.password();
        return Ok(ResolvedTarget {
            input: profile.host,
            username: target.user.clone().or(profile.username),
            password: target.pass.clone().or(profile_password),
            timeout: target
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(config.probe_timeout),
        });
    }

    let Some(input) = &target.input else {
        return Err("server address required: pass a host/URL or --server NAME".into());
    };
    Ok(ResolvedTarget {
        input: input.clone(),
        username: target.user.clone(),
        password: target.pass.clone(),
        timeout: Duration::from_secs(target.timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS)),
    })
}

async fn discover(
    transport: &Arc<ReqwestTransport>,
    resolved: &ResolvedTarget,
    cancel: CancellationToken,
) -> Result<ServerEndpoints, Box<dyn Error>> {
    let engine = DiscoveryEngine::new(transport.clone()).with_probe_timeout(resolved.timeout);
    let endpoints = engine
        .discover(
            &resolved.input,
            DiscoveryOptions {
                username: resolved.username.clone(),
                password: resolved.password.clone(),
                cancel,
            },
        )
        .await?;
    Ok(endpoints)
}

/// Best-effort login for a stream auth token; servers without stream auth
/// work fine without one.
async fn stream_token(
    transport: &Arc<ReqwestTransport>,
    endpoints: &ServerEndpoints,
    resolved: &ResolvedTarget,
) -> Option<String> {
    let (Some(username), Some(password)) = (&resolved.username, &resolved.password) else {
        return None;
    };
    let api = ZmApi::new(transport.clone(), endpoints.api_url.clone(), resolved.timeout);
    match api.login(username, password).await {
        Ok(session) => Some(session.access_token),
        Err(error) => {
            warn!(error = %error, "Login for stream token failed; emitting unauthenticated URL");
            None
        }
    }
}
