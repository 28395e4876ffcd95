//! Background poller feeding push-mode schedulers.
//!
//! Adapters that own their polling cadence (for example a rate-limited
//! remote API) run one of these and hand the receiving end to
//! [`PollScheduler::run_push`](crate::scheduler::PollScheduler::run_push).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::ports::{SharedDevice, StatusSource};

/// Spawn a task that polls `device` every `period` and forwards each snapshot.
///
/// Failed polls are logged and skipped. The task stops once the returned
/// receiver is dropped.
///
/// # Panics
///
/// Panics if `period` is zero or when called outside of a tokio runtime.
pub fn spawn_poller<D>(
    device: SharedDevice<D>,
    period: Duration,
    capacity: usize,
) -> mpsc::Receiver<D::Status>
where
    D: StatusSource + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            let result = device.lock().await.get_status().await;
            match result {
                Ok(status) => {
                    if tx.send(status).await.is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(%err, "summary poll failed"),
            }
        }
        tracing::debug!("summary receiver dropped, poller stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::ports::share;
    use telebridge_domain::error::DeviceError;

    struct Counter {
        polls: Arc<AtomicU64>,
    }

    impl StatusSource for Counter {
        type Status = u64;

        async fn get_status(&mut self) -> Result<u64, DeviceError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                return Err(DeviceError::Unavailable);
            }
            Ok(n)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_forward_snapshots_and_skip_failures() {
        let polls = Arc::new(AtomicU64::new(0));
        let device = share(Counter {
            polls: Arc::clone(&polls),
        });
        let mut rx = spawn_poller(device, Duration::from_secs(60), 4);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(3));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_polling_when_receiver_dropped() {
        let polls = Arc::new(AtomicU64::new(0));
        let device = share(Counter {
            polls: Arc::clone(&polls),
        });
        let mut rx = spawn_poller(device, Duration::from_secs(60), 4);
        assert_eq!(rx.recv().await, Some(1));
        drop(rx);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(polls.load(Ordering::SeqCst) <= 2);
    }
}
