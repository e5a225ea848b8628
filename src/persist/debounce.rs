//! Timer-based coalescing write queue.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

enum WriterCommand<T> {
    Schedule(T),
    Flush(mpsc::Sender<()>),
    Cancel,
}

type CommandSender<T> = Arc<Mutex<Option<mpsc::Sender<WriterCommand<T>>>>>;

/// Coalesces rapid writes into one.
///
/// At most one payload is pending; each `schedule` replaces it and restarts
/// the quiet period. The payload is handed to the sink once `delay` passes
/// without a new schedule, on `flush`, or when the writer is dropped.
pub struct DebouncedWriter<T = String> {
    tx: CommandSender<T>,
    handle: Option<JoinHandle<()>>,
}

/// Discards a writer's pending payload. Holds no strong reference to the
/// writer, so it never keeps the writer thread alive.
#[derive(Clone)]
pub struct PendingCanceller {
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl PendingCanceller {
    pub(crate) fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Arc::new(cancel),
        }
    }

    pub fn cancel(&self) {
        (self.cancel)();
    }
}

impl<T: Send + 'static> DebouncedWriter<T> {
    /// Spawn the writer thread. If the thread cannot be spawned, writes are
    /// dropped: persistence is best-effort.
    pub fn spawn<F>(name: &str, delay: Duration, sink: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("persist-{}", name))
            .spawn(move || writer_loop(rx, delay, sink));

        match spawned {
            Ok(handle) => Self {
                tx: Arc::new(Mutex::new(Some(tx))),
                handle: Some(handle),
            },
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Failed to spawn persist thread, writes disabled");
                Self {
                    tx: Arc::new(Mutex::new(None)),
                    handle: None,
                }
            }
        }
    }

    /// Replace the pending payload and restart the quiet period.
    pub fn schedule(&self, payload: T) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let _ = tx.send(WriterCommand::Schedule(payload));
        }
    }

    /// Write the pending payload now and wait until it has been handed to
    /// the sink.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        let sent = match self.tx.lock().as_ref() {
            Some(tx) => tx.send(WriterCommand::Flush(ack_tx)).is_ok(),
            None => false,
        };
        // Wait outside the lock so a concurrent cancel is never blocked.
        if sent {
            let _ = ack_rx.recv();
        }
    }

    pub fn canceller(&self) -> PendingCanceller {
        let tx = Arc::downgrade(&self.tx);
        PendingCanceller::new(move || {
            if let Some(tx) = tx.upgrade() {
                if let Some(tx) = tx.lock().as_ref() {
                    let _ = tx.send(WriterCommand::Cancel);
                }
            }
        })
    }
}

impl<T> Drop for DebouncedWriter<T> {
    fn drop(&mut self) {
        // Disconnecting makes the loop write whatever is pending and exit.
        self.tx.lock().take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn writer_loop<T>(
    rx: mpsc::Receiver<WriterCommand<T>>,
    delay: Duration,
    mut sink: impl FnMut(T),
) {
    let mut pending: Option<(T, Instant)> = None;

    loop {
        let timeout = match &pending {
            Some((_, deadline)) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::from_secs(60),
        };

        match rx.recv_timeout(timeout) {
            Ok(WriterCommand::Schedule(payload)) => {
                if pending.is_some() {
                    tracing::trace!("Coalescing pending write");
                }
                pending = Some((payload, Instant::now() + delay));
            }
            Ok(WriterCommand::Flush(ack)) => {
                if let Some((payload, _)) = pending.take() {
                    sink(payload);
                }
                let _ = ack.send(());
            }
            Ok(WriterCommand::Cancel) => {
                if pending.take().is_some() {
                    tracing::trace!("Discarded pending write");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let due = matches!(&pending, Some((_, deadline)) if Instant::now() >= *deadline);
                if due {
                    if let Some((payload, _)) = pending.take() {
                        sink(payload);
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some((payload, _)) = pending.take() {
                    sink(payload);
                }
                break;
            }
        }
    }
}
