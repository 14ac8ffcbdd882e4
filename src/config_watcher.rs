//! Live reload of the settings file

use anyhow::{Context, Result};
use notify::{
    event::{EventKind, ModifyKind},
    Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Changes closer together than this collapse into one reload
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// The settings file changed on disk
#[derive(Debug, Clone)]
pub struct ConfigReloadEvent {
    pub timestamp: Instant,
}

/// Where reload events go
enum ReloadSink {
    Std(mpsc::Sender<ConfigReloadEvent>),
    Calloop(calloop::channel::Sender<ConfigReloadEvent>),
}

impl ReloadSink {
    fn send(&self, event: ConfigReloadEvent) -> bool {
        match self {
            ReloadSink::Std(tx) => tx.send(event).is_ok(),
            ReloadSink::Calloop(tx) => tx.send(event).is_ok(),
        }
    }
}

/// Settings file watcher
///
/// Watches the directory holding the settings file rather than the file
/// itself: editors that save by writing a new file and renaming it over the
/// old one would otherwise leave the watch on a deleted inode.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: Option<mpsc::Receiver<ConfigReloadEvent>>,
}

impl ConfigWatcher {
    /// Watch `config_path`, polling for reloads with [`ConfigWatcher::try_recv`]
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = watch(&config_path, ReloadSink::Std(tx))?;
        Ok(Self {
            _watcher: watcher,
            receiver: Some(rx),
        })
    }

    /// Watch `config_path`, delivering reloads into a calloop channel
    pub fn with_sender(
        config_path: PathBuf,
        sender: calloop::channel::Sender<ConfigReloadEvent>,
    ) -> Result<Self> {
        let watcher = watch(&config_path, ReloadSink::Calloop(sender))?;
        Ok(Self {
            _watcher: watcher,
            receiver: None,
        })
    }

    /// Pending reload, without blocking.
    ///
    /// Always `None` for a watcher built with [`ConfigWatcher::with_sender`].
    pub fn try_recv(&self) -> Option<ConfigReloadEvent> {
        self.receiver.as_ref()?.try_recv().ok()
    }
}

/// Writes in place, atomic rename-over saves and first-time creation
fn rewrites_content(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(_))
            | EventKind::Create(_)
    )
}

fn watch(config_path: &Path, sink: ReloadSink) -> Result<RecommendedWatcher> {
    let target = config_path.to_path_buf();
    let directory = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = config_path.file_name().map(|n| n.to_os_string());

    let mut last_reload: Option<Instant> = None;

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "Settings watcher error");
                    return;
                }
            };

            let ours = event
                .paths
                .iter()
                .any(|p| p == &target || p.file_name() == file_name.as_deref());
            if !ours || !rewrites_content(&event.kind) {
                tracing::trace!(kind = ?event.kind, "Ignoring file event");
                return;
            }

            let now = Instant::now();
            if last_reload.is_some_and(|last| now.duration_since(last) < DEBOUNCE_DURATION) {
                tracing::trace!("Settings change debounced");
                return;
            }
            last_reload = Some(now);

            tracing::info!("Settings file changed, reloading");
            if !sink.send(ConfigReloadEvent { timestamp: now }) {
                tracing::error!("Settings reload receiver is gone");
            }
        },
        NotifyConfig::default(),
    )
    .context("Failed to create settings watcher")?;

    watcher
        .watch(&directory, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch settings directory: {}", directory.display()))?;

    tracing::info!(path = %config_path.display(), "Watching settings file");

    Ok(watcher)
}
