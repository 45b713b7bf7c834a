//! cvm-session - headless driver for a CVM session
//!
//! Wires together:
//! - Configuration loading
//! - Credential store
//! - HTTP session and account backends
//! - Headless embedding SDK
//! - Lifecycle controller and usage timer

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cvm_api::{LifecyclePhase, Notification, PREMIUM_THANKS_MESSAGE};
use cvm_config::load_config_or_default;
use cvm_core::{
    Collaborators, IntervalTicks, LifecycleController, LifecycleEvent, TickSource,
    spawn_sdk_diagnostics,
};
use cvm_host_http::{
    DEFAULT_REQUEST_TIMEOUT, HeadlessSdk, HttpAccountBackend, HttpSessionBackend, build_client,
};
use cvm_store::{CredentialStore, SqliteStore};
use cvm_util::{
    CREDENTIALS_DB, CVM_CONFIG_ENV, CVM_DATA_DIR_ENV, default_config_path, default_data_dir,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// cvm-session - run a CVM session from the terminal
#[derive(Parser, Debug)]
#[command(name = "cvm-session")]
#[command(about = "Run a time-limited CVM session from the terminal", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/cvm/config.toml)
    #[arg(short, long, env = CVM_CONFIG_ENV, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set CVM_DATA_DIR env var)
    #[arg(short, long, env = CVM_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Acknowledge the risk notice and launch without asking
    #[arg(long)]
    accept_risk: bool,

    /// Endpoint URL to launch from (must be one of the configured endpoints)
    #[arg(short, long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

/// How to get past the auth gate. Without one, a persisted login is reused
/// and otherwise the session runs as guest.
#[derive(Subcommand, Debug)]
enum Mode {
    /// Continue without an account
    Guest,
    /// Log in to an existing account
    Login {
        username: String,
        #[arg(long, env = "CVM_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
    /// Create an account
    Signup {
        username: String,
        #[arg(long, env = "CVM_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
}

/// Terminal rendering of controller events
fn render(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::Authenticated {
            identifier,
            entitlement,
        } => println!("Signed in as {identifier} ({entitlement:?})"),
        LifecycleEvent::AuthModeChanged { mode } => println!("{}", mode.title()),
        LifecycleEvent::EndpointSelected { url } => println!("Endpoint: {url}"),
        LifecycleEvent::SessionAttached { descriptor } => {
            println!("Session ready: {}", descriptor.embed_url);
        }
        LifecycleEvent::TimerText { text } => println!("Time left: {text}"),
        LifecycleEvent::Notify(notification) => match notification {
            Notification::AuthError { message } => eprintln!("Error: {message}"),
            Notification::LaunchFailed { message } => eprintln!("{message}"),
            Notification::LowTime { remaining_seconds } => {
                println!("Only {remaining_seconds} seconds left in this session.");
            }
            Notification::BlackScreenPrompt => {
                println!("If the screen stays black, check your network or try another endpoint.");
            }
            Notification::ConnectivityHelp => {
                println!("Try a different endpoint, disable proxies or VPNs, and retry later.");
            }
            Notification::SessionEnded => println!("Your session has ended."),
        },
        LifecycleEvent::NavigateTo { url } => println!("Returning to {url}"),
        other => tracing::debug!(event = ?other, "Lifecycle event"),
    }
}

fn render_all(events: Vec<LifecycleEvent>) {
    for event in &events {
        render(event);
    }
}

struct Session {
    controller: LifecycleController,
}

impl Session {
    fn new(args: &Args) -> Result<Self> {
        let settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            endpoint_count = settings.endpoints.len(),
            "Configuration loaded"
        );

        let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(CREDENTIALS_DB);
        let store: Arc<dyn CredentialStore> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open credential store {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Credential store opened");

        let client = build_client(DEFAULT_REQUEST_TIMEOUT)?;
        let collaborators = Collaborators {
            store,
            account: Arc::new(HttpAccountBackend::new(
                client.clone(),
                settings.account.base_url.clone(),
            )),
            session: Arc::new(HttpSessionBackend::new(client.clone())),
            sdk: Arc::new(HeadlessSdk::new(client)),
        };

        let controller = LifecycleController::new(settings, collaborators)?;
        Ok(Self { controller })
    }

    async fn authenticate(&mut self, mode: Option<&Mode>) -> Result<()> {
        let controller = &mut self.controller;
        match mode {
            None => {
                render_all(controller.boot());
                if controller.phase() == LifecyclePhase::Unauthenticated {
                    render_all(controller.enter_as_guest());
                }
            }
            Some(Mode::Guest) => render_all(controller.enter_as_guest()),
            Some(Mode::Login { username, password }) => {
                render_all(controller.submit_credentials(username, password).await);
            }
            Some(Mode::Signup { username, password }) => {
                render_all(controller.toggle_auth_mode());
                render_all(controller.submit_credentials(username, password).await);
            }
        }

        if controller.phase() != LifecyclePhase::AwaitingConsent {
            bail!("Authentication did not complete");
        }

        let presentation = controller.presentation(&cvm_util::now());
        if let Some(greeting) = presentation.greeting {
            println!("{greeting}");
        }
        if presentation.premium_notice {
            println!("{PREMIUM_THANKS_MESSAGE}");
        }
        Ok(())
    }

    async fn launch(&mut self, args: &Args) -> Result<()> {
        let controller = &mut self.controller;
        if let Some(url) = &args.endpoint {
            if !controller.endpoints().iter().any(|e| &e.url == url) {
                bail!("Unknown endpoint {url}");
            }
            render_all(controller.select_endpoint(url));
        }

        if !args.accept_risk {
            bail!("Pass --accept-risk to acknowledge the usage notice and launch");
        }
        render_all(controller.set_consent_acknowledged(true));
        render_all(controller.confirm_consent().await);

        if controller.phase() != LifecyclePhase::Active {
            bail!("Launch failed");
        }

        if let Some(events) = controller.take_sdk_events() {
            spawn_sdk_diagnostics(controller.visit_id(), events);
        }
        Ok(())
    }

    async fn run_timer(&mut self) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut ticks = IntervalTicks::every_second();

        info!("Session running");

        while self.controller.timer_running() {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, leaving session");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, leaving session");
                    break;
                }
                elapsed = ticks.next_tick() => {
                    render_all(self.controller.on_tick(elapsed));
                }
            }
        }

        if self.controller.timer_running() {
            warn!("Session left before the quota ran out");
            render_all(self.controller.cancel_timer());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "cvm-session starting");

    let mut session = Session::new(&args)?;
    session.authenticate(args.mode.as_ref()).await?;
    session.launch(&args).await?;
    session.run_timer().await
}
