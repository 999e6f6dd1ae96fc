//! Stop signalling.
//!
//! The orchestrator blocks on a [`StopSignal`] while the workers sample. Any
//! number of [`StopHandle`]s can fire it: a keypress listener, a timer, the
//! worker pool itself once every worker has exhausted its sample limit, or a
//! test. The first trigger wins; later ones are no-ops.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Waiting side of the stop channel, held by the orchestrator.
#[derive(Debug)]
pub struct StopSignal {
    handle: StopHandle,
    rx: Receiver<()>,
}

/// Firing side of the stop channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct StopHandle {
    tx: Sender<()>,
    fired: Arc<AtomicBool>,
}

impl StopSignal {
    /// Creates an unfired signal.
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self {
            handle: StopHandle {
                tx,
                fired: Arc::new(AtomicBool::new(false)),
            },
            rx,
        }
    }

    /// Returns a handle that can fire this signal.
    pub fn handle(&self) -> StopHandle {
        self.handle.clone()
    }

    /// Returns whether any handle has fired.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.handle.is_triggered()
    }

    /// Blocks until the signal fires.
    ///
    /// The signal keeps its own sender alive, so the channel can never
    /// disconnect underneath the wait.
    pub fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        if self.rx.recv().is_err() {
            tracing::warn!("Stop channel disconnected; treating as stop");
        }
    }

    /// Blocks for at most `timeout`. Returns `true` if the signal fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_triggered(),
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    /// Fires the signal. Only the first call has an effect.
    pub fn trigger(&self) {
        if !self.fired.swap(true, Ordering::AcqRel) {
            // Capacity 1 and a single successful swap: the send cannot block.
            let _ = self.tx.try_send(());
        }
    }

    /// Returns whether the signal has fired.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Fires `handle` once a line (or end of input) arrives on `input`.
///
/// The listener runs on its own detached thread since a blocking read cannot
/// be interrupted.
pub fn spawn_input_listener<R>(mut input: R, handle: StopHandle) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("piculator-input".into())
        .spawn(move || {
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => tracing::debug!("Input closed, stopping"),
                Ok(_) => tracing::debug!("Input received, stopping"),
                Err(err) => tracing::warn!(%err, "Input read failed, stopping"),
            }
            handle.trigger();
        })
}

/// Fires `handle` when stdin delivers a line or closes.
pub fn spawn_stdin_listener(handle: StopHandle) -> io::Result<JoinHandle<()>> {
    spawn_input_listener(io::BufReader::new(io::stdin()), handle)
}

/// Fires `handle` after `duration`.
pub fn spawn_timer(duration: Duration, handle: StopHandle) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("piculator-timer".into())
        .spawn(move || {
            thread::sleep(duration);
            tracing::debug!(?duration, "Timer elapsed, stopping");
            handle.trigger();
        })
}
