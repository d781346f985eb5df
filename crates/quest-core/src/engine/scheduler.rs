//! Pausas de presentación cancelables.
//!
//! Los retardos entre mensajes son cosméticos: nunca forman parte de la
//! corrección del flujo, pero sí deben poder cancelarse en el teardown para
//! que no aparezcan mensajes después de que el host se destruyó.
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

#[async_trait]
pub trait PresentationScheduler: Send + Sync {
    /// Espera `delay`; `false` si la espera se canceló (o ya estaba cancelada).
    async fn pause(&self, delay: Duration) -> bool;
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
}

/// Scheduler basado en `tokio::time`.
#[derive(Debug, Default)]
pub struct TokioScheduler {
    cancelled: AtomicBool,
    wake: Notify,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresentationScheduler for TokioScheduler {
    async fn pause(&self, delay: Duration) -> bool {
        let mut notified = pin!(self.wake.notified());
        // Registrar el waiter antes de mirar el flag: un cancel concurrente no se pierde.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return false;
        }
        if delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.is_cancelled(),
            _ = notified => false,
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_waiters();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Sin espera real; respeta igualmente la cancelación.
#[derive(Debug, Default)]
pub struct InstantScheduler {
    cancelled: AtomicBool,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresentationScheduler for InstantScheduler {
    async fn pause(&self, _delay: Duration) -> bool {
        !self.is_cancelled()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn cancel_wakes_a_pending_pause() {
        let scheduler = Arc::new(TokioScheduler::new());
        let waiter = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.pause(Duration::from_secs(60)).await })
        };
        tokio::task::yield_now().await;
        scheduler.cancel();
        let finished = tokio::time::timeout(Duration::from_secs(5), waiter).await
                                                                         .expect("pause should return promptly")
                                                                         .unwrap();
        assert!(!finished);
        assert!(!scheduler.pause(Duration::ZERO).await);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_pause_reports_completion() {
        let scheduler = TokioScheduler::new();
        assert!(scheduler.pause(Duration::from_millis(250)).await);
    }

    #[test]
    fn instant_scheduler_honours_cancel() {
        let scheduler = InstantScheduler::new();
        assert!(tokio_test::block_on(scheduler.pause(Duration::from_secs(3))));
        scheduler.cancel();
        assert!(!tokio_test::block_on(scheduler.pause(Duration::ZERO)));
    }
}
