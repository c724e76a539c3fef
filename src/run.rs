//! Application execution logic.
//!
//! This module dispatches subcommands: one-shot commands run a
//! [`Session`] on the blocking pool, while `watch` runs the polling
//! monitors until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::signal;
use tokio::task::JoinError;
use tokio_stream::{Stream, StreamExt};

use ethcfg::config::{Command, ValidatedConfig};
use ethcfg::gateway::{ConfigurationGateway, FileGateway};
use ethcfg::monitor::{ConfigurationSampler, PollingMonitor, ReachabilitySampler};
use ethcfg::network::platform::PlatformProvider;
use ethcfg::network::{IpAssignment, LinkError, LinkProvider};
use ethcfg::probe::{Prober, ProbeTarget, ReachabilityProbe};
use ethcfg::reconcile::{ConfigurationState, Reconciler};
use ethcfg::session::{ConfigurationForm, Notice, Session, SubmitError};
use ethcfg::validate::StaticForm;

/// Type alias for the application's reconciler.
type AppReconciler = Reconciler<FileGateway, Arc<PlatformProvider>>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to enumerate interfaces for the profile store.
    #[error("Failed to discover interfaces: {0}")]
    Discovery(#[source] LinkError),

    /// The configuration service is unusable.
    #[error("{0}")]
    Unavailable(Notice),

    /// No interface can be configured.
    #[error("No configurable interface available")]
    NoInterface,

    /// The requested interface is not configurable.
    #[error("Interface '{interface}' is not available")]
    UnknownInterface {
        /// The requested interface
        interface: String,
    },

    /// The configuration was not applied.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The probe could not connect.
    #[error("Internet is not reachable via {target}")]
    Unreachable {
        /// The probe target
        target: ProbeTarget,
    },

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[source] JoinError),

    /// Unexpected stream termination.
    #[error("Monitor stream terminated unexpectedly")]
    StreamTerminated,
}

/// Options for the `watch` loop extracted from validated config.
#[derive(Debug, Clone)]
struct WatchOptions {
    config_interval: Duration,
    probe_interval: Duration,
    probe: Option<ReachabilityProbe>,
}

impl WatchOptions {
    fn new(config: &ValidatedConfig, no_probe: bool) -> Self {
        Self {
            config_interval: config.config_interval,
            probe_interval: config.probe_interval,
            probe: (!no_probe).then(|| config.probe.clone()),
        }
    }
}

/// Executes a subcommand.
///
/// # Errors
///
/// Returns an error if:
/// - Interface discovery or the configuration service fails
/// - The requested interface does not exist
/// - A submitted configuration is invalid or rejected
/// - The `probe` command finds the internet unreachable
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires
/// live network state and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<(), RunError> {
    match command {
        Command::Probe => run_probe(config.probe).await,
        Command::Watch {
            interface,
            no_probe,
        } => {
            let options = WatchOptions::new(&config, no_probe);
            let reconciler = blocking(move || build_reconciler(&config)).await??;
            run_watch_loop(reconciler, interface, options).await
        }
        Command::Init { .. } => Ok(()),
        command => {
            blocking(move || -> Result<(), RunError> {
                let reconciler = build_reconciler(&config)?;
                let mut session = Session::open(reconciler);
                let output = run_session_command(&mut session, &command)?;
                println!("{output}");
                Ok(())
            })
            .await?
        }
    }
}

/// Runs `f` on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, RunError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(RunError::Task)
}

/// Builds the file-backed reconciler, discovering interfaces if none are configured.
///
/// Excluded from coverage - reads live interface state.
#[cfg(not(tarpaulin_include))]
fn build_reconciler(config: &ValidatedConfig) -> Result<Arc<AppReconciler>, RunError> {
    let links = Arc::new(PlatformProvider::new(config.link_paths.clone()));

    let interfaces = if config.interfaces.is_empty() {
        let discovered = discover_interfaces(&links).map_err(RunError::Discovery)?;
        tracing::debug!("Discovered interfaces: {discovered:?}");
        discovered
    } else {
        config.interfaces.clone()
    };

    let gateway =
        FileGateway::new(&config.store_path, interfaces).with_addressing(config.addressing);
    tracing::debug!("Profile store: {}", gateway.path().display());

    Ok(Arc::new(Reconciler::new(gateway, links)))
}

/// Lists live interfaces that are not loopback.
fn discover_interfaces(links: &impl LinkProvider) -> Result<Vec<String>, LinkError> {
    let mut interfaces = Vec::new();
    for name in links.interface_names()? {
        let is_loopback = links
            .snapshot(&name)?
            .is_some_and(|snapshot| snapshot.addresses.iter().any(|a| a.address.is_loopback()));
        if !is_loopback {
            interfaces.push(name);
        }
    }
    Ok(interfaces)
}

/// Runs a one-shot command against a session, returning the text to print.
fn run_session_command<G, L>(
    session: &mut Session<G, L>,
    command: &Command,
) -> Result<String, RunError>
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    ensure_available(session)?;

    match command {
        Command::List => Ok(list_interfaces(session)),
        Command::Show { interface } => {
            let interface = select(session, interface.as_deref())?;
            Ok(format!("{interface}\n{}", session.current()))
        }
        Command::Set {
            interface,
            dhcp,
            address,
            gateway,
            dns,
        } => {
            let interface = select(session, Some(interface))?;
            let form = set_form(*dhcp, address.as_deref(), gateway.as_deref(), dns.as_deref());
            let state = session.submit(&form)?;
            tracing::info!("Applied configuration to {interface}");
            Ok(format!("{interface}\n{state}"))
        }
        Command::Init { .. } | Command::Watch { .. } | Command::Probe => Ok(String::new()),
    }
}

/// Fails with the session's notice when the configuration service is unusable.
fn ensure_available<G, L>(session: &Session<G, L>) -> Result<(), RunError>
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    match session.notices().first() {
        Some(notice) if session.available_interfaces().is_empty() => {
            Err(RunError::Unavailable(notice.clone()))
        }
        _ => Ok(()),
    }
}

fn list_interfaces<G, L>(session: &Session<G, L>) -> String
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    let active = session.active_interface();
    session
        .available_interfaces()
        .iter()
        .map(|name| {
            let marker = if Some(name.as_str()) == active { '*' } else { ' ' };
            format!("{marker} {name}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Selects `interface`, or keeps the session's default selection when `None`.
fn select<G, L>(session: &mut Session<G, L>, interface: Option<&str>) -> Result<String, RunError>
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    match interface {
        Some(name) => {
            if !session.available_interfaces().iter().any(|known| known == name) {
                return Err(RunError::UnknownInterface {
                    interface: name.to_string(),
                });
            }
            session.select_interface(name);
            Ok(name.to_string())
        }
        None => session
            .active_interface()
            .map(ToString::to_string)
            .ok_or(RunError::NoInterface),
    }
}

/// Builds the submission for `set` arguments.
fn set_form(
    dhcp: bool,
    address: Option<&str>,
    gateway: Option<&str>,
    dns: Option<&str>,
) -> ConfigurationForm {
    if dhcp {
        return ConfigurationForm::Dhcp;
    }
    ConfigurationForm::Static(StaticForm::new(
        address.unwrap_or_default(),
        gateway.unwrap_or_default(),
        dns.unwrap_or_default(),
    ))
}

/// One-line description of a configuration state for logs.
fn summarize(state: &ConfigurationState) -> String {
    let Some(config) = state.configuration() else {
        return state.to_string();
    };
    let Some(params) = &config.static_config else {
        return config.assignment.to_string();
    };

    let address = params
        .ip_address
        .map_or_else(|| "N/A".to_string(), |address| address.to_string());
    let mut summary = format!("{} {address} via {}", config.assignment, params.gateway);
    if !params.dns_servers.is_empty() {
        summary.push_str(&format!(", dns {}", params.dns_list()));
    }
    if config.assignment == IpAssignment::Dhcp {
        summary.push_str(" (lease)");
    }
    summary
}

/// Probes reachability once.
///
/// Excluded from coverage - requires network access.
#[cfg(not(tarpaulin_include))]
async fn run_probe(probe: ReachabilityProbe) -> Result<(), RunError> {
    let target = probe.target().clone();
    tracing::debug!("Probing {target} (timeout {}ms)", probe.timeout().as_millis());
    let online = blocking(move || probe.is_internet_available()).await?;

    if online {
        println!("Internet is reachable via {target}");
        Ok(())
    } else {
        Err(RunError::Unreachable { target })
    }
}

/// Runs the configuration and reachability monitors until shutdown.
///
/// Excluded from coverage - requires live network state and signal handling.
#[cfg(not(tarpaulin_include))]
async fn run_watch_loop(
    reconciler: Arc<AppReconciler>,
    interface: Option<String>,
    options: WatchOptions,
) -> Result<(), RunError> {
    let interface = blocking({
        let reconciler = Arc::clone(&reconciler);
        move || -> Result<String, RunError> {
            let mut session = Session::open(reconciler);
            ensure_available(&session)?;
            select(&mut session, interface.as_deref())
        }
    })
    .await??;

    tracing::info!(
        "Watching {interface} (configuration every {}s)",
        options.config_interval.as_secs()
    );
    let mut config_stream = PollingMonitor::new(
        ConfigurationSampler::new(reconciler, interface.clone()),
        options.config_interval,
    )
    .into_stream();

    let mut probe_stream = options.probe.map(|probe| {
        tracing::info!(
            "Probing {} every {}s",
            probe.target(),
            options.probe_interval.as_secs()
        );
        PollingMonitor::new(ReachabilitySampler::new(probe), options.probe_interval).into_stream()
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            state = config_stream.next() => {
                let Some(state) = state else {
                    return Err(RunError::StreamTerminated);
                };
                tracing::info!("{interface}: {}", summarize(&state));
            }

            online = next_or_pending(probe_stream.as_mut()) => {
                let Some(online) = online else {
                    return Err(RunError::StreamTerminated);
                };
                if online {
                    tracing::info!("Internet reachable");
                } else {
                    tracing::warn!("Internet unreachable");
                }
            }
        }
    }
}

/// Polls an optional stream; never completes when absent.
async fn next_or_pending<S>(stream: Option<&mut S>) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// A signal handler that cannot be installed never fires.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
