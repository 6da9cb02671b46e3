use super::gateway::Gateway;
use super::types::{GameEvent, Outbound};
use crate::domain::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Delivers addressed messages to connections. Implementations must not block.
pub trait Publisher: Send + Sync + 'static {
    fn publish(&self, outbound: Vec<Outbound>);
}

pub async fn world_task<C, P>(
    mut gateway: Gateway<C>,
    mut input_rx: mpsc::Receiver<GameEvent>,
    publisher: P,
    player_count_tx: watch::Sender<usize>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) where
    C: Clock,
    P: Publisher,
{
    // Drive the fixed-step loop; late ticks are not replayed.
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut ticks: u64 = 0;

    loop {
        let reload_wait = gateway
            .next_reload_deadline()
            .map(|due| Duration::from_millis(due.saturating_sub(gateway.now())));

        tokio::select! {
            _ = shutdown.notified() => {
                info!(ticks, "world task shutting down");
                break;
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    info!("input channel closed; world task exiting");
                    break;
                };
                let membership_change = matches!(
                    event,
                    GameEvent::Connect { .. } | GameEvent::Disconnect { .. }
                );
                publisher.publish(gateway.handle_event(event));
                if membership_change {
                    player_count_tx.send_replace(gateway.player_count());
                }
            }
            _ = interval.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick).as_secs_f32();
                last_tick = now;
                ticks += 1;

                gateway.step(dt);
                publisher.publish(vec![gateway.snapshot_broadcast()]);
            }
            _ = tokio::time::sleep(reload_wait.unwrap_or_default()), if reload_wait.is_some() => {
                let completed = gateway.complete_due_reloads();
                if !completed.is_empty() {
                    debug!(count = completed.len(), "reloads completed");
                }
                publisher.publish(completed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameTuning, SystemClock, WorldState};
    use crate::use_cases::types::{Audience, ServerEvent};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        sent: Arc<Mutex<Vec<Outbound>>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, outbound: Vec<Outbound>) {
            self.sent.lock().expect("publisher lock").extend(outbound);
        }
    }

    impl RecordingPublisher {
        fn count(&self, pred: impl Fn(&Outbound) -> bool) -> usize {
            self.sent
                .lock()
                .expect("publisher lock")
                .iter()
                .filter(|o| pred(o))
                .count()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn when_world_task_runs_then_it_greets_joiners_and_streams_snapshots() {
        let gateway = Gateway::new(
            WorldState::empty(GameTuning::default(), 1),
            SystemClock,
        );
        let (input_tx, input_rx) = mpsc::channel(16);
        let (count_tx, count_rx) = watch::channel(0usize);
        let publisher = RecordingPublisher::default();
        let shutdown = Arc::new(Notify::new());

        let task = tokio::spawn(world_task(
            gateway,
            input_rx,
            publisher.clone(),
            count_tx,
            Duration::from_millis(16),
            shutdown.clone(),
        ));

        input_tx
            .send(GameEvent::Connect { connection_id: 7 })
            .await
            .expect("send connect");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*count_rx.borrow(), 1);
        assert_eq!(
            publisher.count(|o| o.audience == Audience::Only(7)
                && matches!(o.event, ServerEvent::Init(_))),
            1
        );
        assert!(publisher.count(|o| matches!(o.event, ServerEvent::State(_))) >= 3);

        input_tx
            .send(GameEvent::Disconnect { connection_id: 7 })
            .await
            .expect("send disconnect");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*count_rx.borrow(), 0);

        shutdown.notify_one();
        task.await.expect("world task join");
    }
}
