use crate::domain::ports::Clock;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Re-invokes a render callback on a fixed interval until the callback
/// breaks or `shutdown` resolves. The first tick fires immediately.
pub struct Ticker<C: Clock> {
    clock: C,
    interval: Duration,
}

impl<C: Clock> Ticker<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self { clock, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the number of ticks delivered.
    pub async fn run<F, S>(&self, shutdown: S, mut on_tick: F) -> u64
    where
        F: FnMut(DateTime<Utc>) -> ControlFlow<()>,
        S: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("Ticker stopped after {} ticks", ticks);
                    break;
                }
                _ = interval.tick() => {
                    ticks += 1;
                    if on_tick(self.clock.now()).is_break() {
                        break;
                    }
                }
            }
        }

        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::SystemClock;

    #[tokio::test]
    async fn stops_when_callback_breaks() {
        let ticker = Ticker::new(SystemClock, Duration::from_millis(5));
        let mut seen = Vec::new();

        let ticks = ticker
            .run(std::future::pending(), |now| {
                seen.push(now);
                if seen.len() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(ticks, 3);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn stops_on_shutdown() {
        let ticker = Ticker::new(SystemClock, Duration::from_secs(3600));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();

        let ticks = ticker
            .run(
                async {
                    let _ = rx.await;
                },
                |_| ControlFlow::Continue(()),
            )
            .await;

        // Either the immediate first tick or the shutdown wins the race, never more.
        assert!(ticks <= 1);
    }
}
