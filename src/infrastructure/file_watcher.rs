use crate::core::models::{FsEvent, FsEventKind};
use crate::utils::security::RootPath;
use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Events the broadcast loop has not picked up yet. Anything beyond this is
/// dropped at the watcher.
pub const INTAKE_CAPACITY: usize = 1;

/// Keeps the OS watch alive. Dropping it stops the watch and closes the intake.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

/// Sets up a recursive watch on the root. Failure here is fatal for the server.
pub fn start_file_watcher(root: &RootPath) -> Result<(FileWatcher, mpsc::Receiver<FsEvent>)> {
    let (tx, rx) = mpsc::channel(INTAKE_CAPACITY);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => forward_event(event, &tx),
            Err(e) => tracing::error!("Watch error: {:?}", e),
        },
        Config::default(),
    )
    .context("Cannot create filesystem watcher")?;

    watcher
        .watch(root.as_path(), RecursiveMode::Recursive)
        .with_context(|| format!("Cannot watch {:?}", root.as_path()))?;

    tracing::info!("Watching {:?} recursively", root.as_path());

    Ok((FileWatcher { _watcher: watcher }, rx))
}

fn classify(kind: &EventKind) -> Option<FsEventKind> {
    match kind {
        EventKind::Create(_) => Some(FsEventKind::Created),
        EventKind::Remove(_) => Some(FsEventKind::Removed),
        EventKind::Modify(ModifyKind::Name(_)) => Some(FsEventKind::Renamed),
        _ => None,
    }
}

/// Pushes one [`FsEvent`] per reported path without ever blocking the
/// notify thread.
fn forward_event(event: Event, tx: &mpsc::Sender<FsEvent>) {
    let Some(kind) = classify(&event.kind) else {
        return;
    };

    for path in event.paths {
        match tx.try_send(FsEvent::new(kind, path)) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::trace!("Intake full, dropping {} {:?}", dropped.kind, dropped.path)
            }
            Err(TrySendError::Closed(_)) => return,
        }
    }
}
