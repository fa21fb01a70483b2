use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay between the last keystroke and the search it triggers
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// Timer-token debounce.
///
/// Every `arm` cancels the pending timer and starts a new one. A timer only
/// counts when `settle` is called with the token of the latest `arm`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    current: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            current: 0,
            pending: None,
        }
    }

    /// Cancel any pending timer and arm a new one. `on_elapsed` runs with the
    /// new token once the delay passes without another `arm`.
    pub fn arm<F>(&mut self, on_elapsed: F) -> DebounceToken
    where
        F: FnOnce(DebounceToken) + Send + 'static,
    {
        self.cancel();
        self.current += 1;
        let token = DebounceToken(self.current);
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_elapsed(token);
        }));
        token
    }

    /// Drop the pending timer, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Accept an elapsed timer. True only for the token of the latest `arm`,
    /// and only once.
    pub fn settle(&mut self, token: DebounceToken) -> bool {
        if token.0 == self.current && self.pending.is_some() {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
