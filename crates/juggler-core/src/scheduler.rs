//! Periodic tasks: the throw scheduler and the per-ball flight timer.
//!
//! Both are plain async loops over a [`tokio::time::Interval`] raced
//! against the juggler's generation channel. The first tick fires one
//! period after the task starts. Missed ticks are delayed rather than
//! bursted, so a stalled runtime never advances a flight by several
//! seconds at once.

use std::sync::Arc;
use std::time::Duration;

use juggler_types::{BallId, GenerationId};
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::juggler::{FlightProgress, Juggler};

/// An interval whose first tick is one `period` from now.
fn delayed_interval(period: Duration) -> Interval {
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Wait until the generation channel moves away from `generation`.
///
/// Resolves immediately if a reset already happened before the task
/// subscribed, or if the channel is closed.
async fn superseded(generations: &mut watch::Receiver<GenerationId>, generation: GenerationId) {
    loop {
        if *generations.borrow_and_update() != generation {
            return;
        }
        if generations.changed().await.is_err() {
            return;
        }
    }
}

/// Throw scheduler for one generation.
///
/// Every `throw_interval` it ends the generation if time is up or the
/// juggler was stopped, and otherwise throws every ball currently in hand.
pub(crate) async fn run_throw_scheduler(juggler: Arc<Juggler>, generation: GenerationId) {
    let mut generations = juggler.subscribe_generations();
    let mut ticker = delayed_interval(juggler.timing().throw_interval());

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = superseded(&mut generations, generation) => {
                debug!(%generation, "Throw scheduler superseded by reset");
                return;
            }
        }

        if juggler.finish_if_over(generation).await {
            info!(%generation, "Throw scheduler finished");
            return;
        }

        match juggler.throw_all_in_hand(generation).await {
            None => {
                debug!(%generation, "Throw scheduler superseded by reset");
                return;
            }
            Some(0) => {}
            Some(thrown) => {
                let elapsed_secs = juggler.elapsed().await.as_secs();
                debug!(%generation, thrown, elapsed_secs, "Threw balls");
                juggler.log_state().await;
            }
        }
    }
}

/// Flight timer for one thrown ball.
///
/// Advances the ball once per `flight_tick` until it is caught. Exits
/// early, leaving the ball untouched, as soon as its generation is
/// superseded.
pub(crate) async fn run_flight(juggler: Arc<Juggler>, generation: GenerationId, ball_id: BallId) {
    let mut generations = juggler.subscribe_generations();
    let mut ticker = delayed_interval(juggler.timing().flight_tick());

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            () = superseded(&mut generations, generation) => {
                debug!(%generation, ball = %ball_id, "Flight abandoned by reset");
                return;
            }
        }

        match juggler.advance_flight(generation, ball_id).await {
            FlightProgress::Airborne => {}
            FlightProgress::Caught => return,
            FlightProgress::Orphaned => {
                debug!(%generation, ball = %ball_id, "Flight orphaned");
                return;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use juggler_types::BallStatus;

    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn task_futures_are_send() {
        let juggler = Arc::new(Juggler::default());
        let scheduler = run_throw_scheduler(Arc::clone(&juggler), GenerationId::default());
        assert_send(&scheduler);
        let flight = run_flight(juggler, GenerationId::default(), BallId::FIRST);
        assert_send(&flight);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_throws_every_ball_on_first_tick() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(3, 2).await;
        let _handle = juggler.start(generation);

        tokio::time::sleep(Duration::from_millis(600)).await;

        let stats = juggler.stats().await;
        assert_eq!(stats.in_hand, 0);
        assert_eq!(stats.in_air, 3);
        assert!(stats.balls.iter().all(|b| b.status == BallStatus::InFlight));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_rethrows_caught_balls() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(1, 2).await;
        let _handle = juggler.start(generation);

        // First throw at 0.5s, caught by 10.5s at the latest, rethrown on
        // the following scheduler tick.
        tokio::time::sleep(Duration::from_secs(12)).await;

        let stats = juggler.stats().await;
        assert_eq!(stats.in_hand.saturating_add(stats.in_air), 1);
        let ball = stats.balls.first().unwrap();
        let thrown_at = ball.flight_start.unwrap();
        assert_eq!(ball.id, BallId(1));
        assert!(thrown_at <= chrono::Utc::now());
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_finishes_when_time_is_up() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(2, 1).await;
        let handle = juggler.start(generation);

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(handle.is_finished());
        assert!(juggler.is_finished().await);
        assert!(!juggler.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_exits_after_stop() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(2, 5).await;
        let handle = juggler.start(generation);

        juggler.stop().await;
        handle.await.unwrap();

        assert!(juggler.is_finished().await);
        let stats = juggler.stats().await;
        assert_eq!(stats.in_hand, 2);
        assert_eq!(stats.in_air, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_scheduler_never_throws() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(3, 0).await;
        juggler.start(generation).await.unwrap();

        assert!(juggler.is_finished().await);
        assert_eq!(juggler.stats().await.in_hand, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_supersedes_running_scheduler() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(2, 5).await;
        let old = juggler.start(generation);

        juggler.reset(4, 5).await;
        old.await.unwrap();

        // The old scheduler must not have marked the new generation done.
        assert!(!juggler.is_finished().await);
        let stats = juggler.stats().await;
        assert_eq!(stats.in_hand, 4);
        assert_eq!(stats.in_air, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interleaved_starts_run_one_scheduler_for_latest_generation() {
        let juggler = Arc::new(Juggler::default());
        let first = juggler.reset(2, 5).await;
        let second = juggler.reset(4, 5).await;

        // Both callers start after both resets: only the scheduler for the
        // generation that is still current may keep running.
        let stale = juggler.start(first);
        let current = juggler.start(second);

        stale.await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!current.is_finished());
        assert_eq!(juggler.generation().await, second);
        assert!(!juggler.is_finished().await);
        let stats = juggler.stats().await;
        assert_eq!(stats.balls.len(), 4);
        assert_eq!(stats.in_hand.saturating_add(stats.in_air), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_see_a_consistent_partition() {
        let juggler = Arc::new(Juggler::default());
        let generation = juggler.reset(6, 2).await;
        let _handle = juggler.start(generation);

        let mut readers = Vec::new();
        for _ in 0..4 {
            let reader = Arc::clone(&juggler);
            readers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let stats = reader.stats().await;
                    let mut seen: Vec<BallId> = stats.balls.iter().map(|b| b.id).collect();
                    seen.dedup();
                    assert_eq!(seen.len(), 6);
                    assert_eq!(stats.in_hand.saturating_add(stats.in_air), 6);
                    let flying = stats
                        .balls
                        .iter()
                        .filter(|b| b.status == BallStatus::InFlight)
                        .count();
                    assert_eq!(flying, stats.in_air);
                    assert!(
                        stats
                            .balls
                            .iter()
                            .filter(|b| b.status == BallStatus::InFlight)
                            .all(|b| b.elapsed_secs < b.flight_duration_secs)
                    );
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            }));
        }
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
