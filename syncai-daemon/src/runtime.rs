use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};

use syncai_core::Config;
use syncai_sync::{ScanReport, Scanner, SyncEngine};

use crate::error::{io_err, DaemonError};
use crate::paths::{is_own_temp_file, watch_dirs, DEBOUNCE_WINDOW};

/// How `syncai watch` runs.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Time between periodic scans.
    pub interval: Duration,
    /// Also react to filesystem notifications between scans.
    pub events: bool,
    /// Seed the hash table without reconciling existing files first.
    pub skip_initial: bool,
}

impl WatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.interval,
            events: false,
            skip_initial: false,
        }
    }
}

/// What asked for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanTrigger {
    Interval,
    Event,
}

/// Start the watch runtime and block the current thread until it exits.
pub fn start_blocking(config: Config, options: WatchOptions) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config, options))
}

/// Run the watch runtime until ctrl-c.
pub async fn run(config: Config, options: WatchOptions) -> Result<(), DaemonError> {
    tracing::info!(
        workdir = %config.workdir.display(),
        agents = config.agents.len(),
        interval_ms = options.interval.as_millis() as u64,
        events = options.events,
        "starting watch",
    );

    let watch_paths = watch_dirs(&config.agents);
    let mut scanner = Scanner::new(SyncEngine::new(config.agents));
    let skip_initial = options.skip_initial;
    scanner = tokio::task::spawn_blocking(move || {
        let result = if skip_initial {
            scanner.seed()
        } else {
            scanner.initial_sync().map(|report| log_report("initial", &report))
        };
        result.map(|()| scanner)
    })
    .await
    .map_err(|err| join_error("initial_sync", err))??;

    let (scan_tx, scan_rx) = mpsc::channel::<ScanTrigger>(1);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = scan_processor_task(scanner, scan_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let ticker_handle = {
        let shutdown = shutdown_tx.clone();
        let scan_tx = scan_tx.clone();
        let interval = options.interval;
        tokio::spawn(async move {
            let result = ticker_task(interval, scan_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let enabled = options.events;
        tokio::spawn(async move {
            if !enabled {
                return Ok(());
            }
            let result = watcher_task(watch_paths, scan_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, stopping watch");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(io_err("ctrl-c handler", err)),
                    }
                }
            }
        })
    };

    let (processor_result, ticker_result, watcher_result, signal_result) =
        tokio::join!(processor_handle, ticker_handle, watcher_handle, signal_handle);

    handle_join("scan_processor", processor_result)?;
    handle_join("ticker", ticker_result)?;
    handle_join("watcher", watcher_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

/// Runs scans one at a time; triggers arriving during a scan coalesce.
async fn scan_processor_task(
    mut scanner: Scanner,
    mut scan_rx: mpsc::Receiver<ScanTrigger>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            trigger = scan_rx.recv() => {
                let Some(trigger) = trigger else { break };
                let started = Instant::now();
                let (returned, result) = tokio::task::spawn_blocking(move || {
                    let result = scanner.scan();
                    (scanner, result)
                })
                .await
                .map_err(|err| join_error("scan", err))?;
                scanner = returned;

                match result {
                    Ok(report) if report.is_empty() => {
                        tracing::debug!(trigger = ?trigger, "scan found no changes");
                    }
                    Ok(report) => {
                        log_report("scan", &report);
                        tracing::debug!(
                            trigger = ?trigger,
                            duration_ms = started.elapsed().as_millis() as u64,
                            "scan completed",
                        );
                    }
                    Err(err) => tracing::error!(error = %err, "scan failed"),
                }
            }
        }
    }
    Ok(())
}

async fn ticker_task(
    period: Duration,
    scan_tx: mpsc::Sender<ScanTrigger>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                // A full channel means a scan is already queued.
                if let Err(mpsc::error::TrySendError::Closed(_)) = scan_tx.try_send(ScanTrigger::Interval) {
                    break;
                }
            }
        }
    }
    Ok(())
}

async fn watcher_task(
    dirs: Vec<PathBuf>,
    scan_tx: mpsc::Sender<ScanTrigger>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    // Dropping the watcher stops notifications, so it lives for the whole task.
    let mut watcher: RecommendedWatcher = recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })?;
    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching");
    }

    let mut debouncer = Debouncer::new(DEBOUNCE_WINDOW);
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            received = notify_rx.recv() => {
                let Some(received) = received else { break };
                let event = match received {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "notification error; relying on the next scan");
                        continue;
                    }
                };
                if !triggers_scan(&event.kind) {
                    continue;
                }
                let now = Instant::now();
                let fresh = event
                    .paths
                    .iter()
                    .filter(|path| !is_own_temp_file(path))
                    .fold(false, |fresh, path| debouncer.admit(path, now) || fresh);
                if !fresh {
                    continue;
                }
                if let Err(mpsc::error::TrySendError::Closed(_)) = scan_tx.try_send(ScanTrigger::Event) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Creations, content changes, renames and removals can all change what a
/// scan would find; access events cannot.
fn triggers_scan(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Per-path quiet window: an editor's burst of writes asks for one scan.
struct Debouncer {
    window: Duration,
    last_admitted: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: HashMap::new(),
        }
    }

    /// `true` when `path` has not been admitted within the window.
    fn admit(&mut self, path: &Path, now: Instant) -> bool {
        let window = self.window;
        self.last_admitted
            .retain(|_, at| now.saturating_duration_since(*at) < window * 60);
        if let Some(at) = self.last_admitted.get(path) {
            if now.saturating_duration_since(*at) < window {
                return false;
            }
        }
        self.last_admitted.insert(path.to_path_buf(), now);
        true
    }
}

fn log_report(label: &str, report: &ScanReport) {
    tracing::info!(
        pass = label,
        synced = report.synced.len(),
        written = report.written.len(),
        deleted = report.deleted.len(),
        failures = report.failures,
        "sync pass completed",
    );
}

fn join_error(task: &'static str, err: tokio::task::JoinError) -> DaemonError {
    DaemonError::Task {
        task,
        message: err.to_string(),
    }
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(join_error(task, err)),
    }
}

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays machine-readable. `RUST_LOG` overrides the `info` default;
/// records from the `log` facade used by the library crates are captured too.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use syncai_core::Agent;
    use tempfile::TempDir;
    use tokio::time::advance;

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn burst_of_saves_admits_once_per_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let rule = PathBuf::from("/work/.cursor/rules/style.mdc");
        let other = PathBuf::from("/work/.claude/rules/style.md");

        let admitted = {
            let mut admitted = 0;
            for _ in 0..5 {
                admitted += usize::from(debouncer.admit(&rule, Instant::now()));
                advance(Duration::from_millis(10)).await;
            }
            admitted
        };
        assert_eq!(admitted, 1);
        assert!(debouncer.admit(&other, Instant::now()), "windows are per path");

        advance(Duration::from_millis(150)).await;
        assert!(debouncer.admit(&rule, Instant::now()));
    }

    #[test]
    fn only_content_events_trigger_scans() {
        use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
        assert!(triggers_scan(&EventKind::Create(CreateKind::File)));
        assert!(triggers_scan(&EventKind::Modify(ModifyKind::Any)));
        assert!(triggers_scan(&EventKind::Remove(RemoveKind::File)));
        assert!(!triggers_scan(&EventKind::Access(AccessKind::Any)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn processor_scans_on_trigger_and_stops_on_shutdown() {
        let tmp = TempDir::new().expect("tmp");
        let root = tmp.path();
        let engine = SyncEngine::new(vec![
            Agent::new("a").with_context("AGENTS.md").rooted_at(root),
            Agent::new("b").with_context("CLAUDE.md").rooted_at(root),
        ]);
        let mut scanner = Scanner::new(engine);
        scanner.seed().expect("seed");

        let (scan_tx, scan_rx) = mpsc::channel(1);
        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = tokio::spawn(scan_processor_task(scanner, scan_rx, shutdown_tx.subscribe()));

        fs::write(root.join("AGENTS.md"), "context\n").expect("write");
        scan_tx.send(ScanTrigger::Event).await.expect("send");

        let mirror = root.join("CLAUDE.md");
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !mirror.exists() && std::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(fs::read_to_string(&mirror).expect("mirror"), "context\n");

        shutdown_tx.send(()).expect("shutdown");
        handle.await.expect("join").expect("processor");
    }
}
