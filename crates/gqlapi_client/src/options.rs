//! Per-request options and cancellation.

use tokio::sync::watch;

/// Options accepted by every request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers sent with the request.
    pub request_headers: Vec<(String, String)>,
    /// Cancels the request when aborted.
    pub signal: Option<AbortSignal>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_headers.push((name.into(), value.into()));
        self
    }

    /// Attaches an abort signal.
    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// Owner side of an abort signal.
#[derive(Debug)]
pub struct AbortController {
    sender: watch::Sender<bool>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    /// Creates a controller whose signal is not yet aborted.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Returns a signal observing this controller.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Aborts every signal handed out by this controller.
    pub fn abort(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes an [`AbortController`].
#[derive(Debug, Clone)]
pub struct AbortSignal {
    receiver: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Returns true once the controller has aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves when the controller aborts.
    ///
    /// Never resolves if the controller is dropped without aborting.
    pub async fn aborted(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
