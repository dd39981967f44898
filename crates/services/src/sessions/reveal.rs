//! Cancellable "show the answer, then move on" delay.

use std::time::Duration;

use tokio::sync::oneshot;

/// Delay that resolves once the reveal pause is over.
///
/// Resolves `false` instead when the paired `AdvanceCanceller` fires or is
/// dropped, so an abandoned session never advances later.
#[derive(Debug)]
pub struct PendingAdvance {
    delay: Duration,
    cancelled: oneshot::Receiver<()>,
}

/// Handle kept by the session to call off its pending advance.
#[derive(Debug)]
pub struct AdvanceCanceller {
    tx: oneshot::Sender<()>,
}

/// Pair a delay with the handle that can cancel it.
#[must_use]
pub fn pending_advance(delay: Duration) -> (PendingAdvance, AdvanceCanceller) {
    let (tx, cancelled) = oneshot::channel();
    (PendingAdvance { delay, cancelled }, AdvanceCanceller { tx })
}

impl PendingAdvance {
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay; `true` when it ran to completion.
    pub async fn elapsed(self) -> bool {
        let Self { delay, cancelled } = self;
        tokio::select! {
            () = tokio::time::sleep(delay) => true,
            _ = cancelled => false,
        }
    }
}

impl AdvanceCanceller {
    pub fn cancel(self) {
        // receiver may already be gone
        let _ = self.tx.send(());
    }
}
