//! Live-reload bridge.
//!
//! The orchestrator does not serve anything itself; it publishes reload
//! events after rebuilds and leaves delivery to a [`ReloadServer`]
//! implementation. The bundled [`ConsoleReload`] just logs, which keeps
//! serve mode useful without a browser attached.

use crate::config::ServeConfig;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

/// One rebuild notification: which task ran and what it wrote.
#[derive(Debug, Clone)]
pub struct ReloadEvent {
    /// Task that rebuilt
    pub task: String,
    /// Destination paths written by the rebuild
    pub paths: Vec<PathBuf>,
}

/// Fan-out hub for reload events.
///
/// Subscribers get a channel receiver; disconnected subscribers are
/// dropped on the next notify.
#[derive(Debug, Default)]
pub struct ReloadHub {
    senders: Mutex<Vec<Sender<ReloadEvent>>>,
}

impl ReloadHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to reload events.
    pub fn subscribe(&self) -> Receiver<ReloadEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        rx
    }

    /// Publish an event to all live subscribers.
    pub fn notify(&self, event: &ReloadEvent) {
        if let Ok(mut senders) = self.senders.lock() {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.senders.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Delivery seam for reload events. Implementations own the transport;
/// the orchestrator only hands them events.
pub trait ReloadServer: Send {
    /// Called once before watching starts.
    fn init(&mut self, serve: &ServeConfig);

    /// Called after each rebuild.
    fn notify(&mut self, event: &ReloadEvent);
}

/// Console-only reload delivery.
#[derive(Debug, Default)]
pub struct ConsoleReload;

impl ReloadServer for ConsoleReload {
    fn init(&mut self, serve: &ServeConfig) {
        println!("Reload bridge ready on {}:{}", serve.host, serve.port);
    }

    fn notify(&mut self, event: &ReloadEvent) {
        println!("Reload: {} ({} file(s))", event.task, event.paths.len());
    }
}

/// Serve mode: watch with a reload bridge attached.
///
/// Rebuild events flow through a hub to the server on a forwarder thread,
/// so a slow delivery never stalls the watch loop.
pub fn run_serve(
    tasks: &crate::registry::TaskSet,
    options: crate::runner::RunOptions,
    selection: &crate::runner::Selection,
    serve: &ServeConfig,
    mut server: Box<dyn ReloadServer>,
) -> Result<(), crate::watch::WatchError> {
    server.init(serve);

    let hub = ReloadHub::new();
    let rx = hub.subscribe();
    let forwarder = std::thread::spawn(move || {
        while let Ok(event) = rx.recv() {
            server.notify(&event);
        }
    });

    let result = crate::watch::run_watch(tasks, options, selection, Some(&hub));
    drop(hub);
    let _ = forwarder.join();
    result
}
