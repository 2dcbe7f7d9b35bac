//! The shared simulation state: balls, the two queues, and timing.
//!
//! [`Juggler`] is the single owner of every ball. All mutations (throw,
//! catch, reset, stop) take the write half of one [`RwLock`] for the
//! duration of their in-memory transition; all queries take the read half.
//! No lock is ever held across a timer wait.
//!
//! # Generations
//!
//! Every [`Juggler::reset`] starts a new generation and publishes its id on
//! a [`watch`] channel. Flight timers and the throw scheduler are tagged
//! with the generation that spawned them. When the generation moves on
//! they exit without touching the new balls, so a timer from an old run
//! can never re-file a ball that happens to share its id.

use std::collections::{BTreeMap, VecDeque};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use juggler_types::{Ball, BallId, BallStatus, BallView, GenerationId, JugglerSnapshot};
use rand::Rng as _;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::config::TimingConfig;
use crate::scheduler;

/// Seconds in one minute of configured juggling time.
const SECS_PER_MINUTE: u64 = 60;

/// Counts and a copy of every ball, taken under one read lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JugglerStats {
    /// Number of balls in the in-hand queue.
    pub in_hand: usize,
    /// Number of balls in the in-air queue.
    pub in_air: usize,
    /// Every ball of the current generation, ordered by id.
    pub balls: Vec<Ball>,
}

/// Result of advancing one flight timer by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlightProgress {
    /// Still airborne after this tick.
    Airborne,
    /// The ball reached its flight duration and is back in hand.
    Caught,
    /// The generation changed or the ball is no longer in flight.
    Orphaned,
}

/// Mutable state guarded by the juggler's lock.
#[derive(Debug)]
struct JugglerState {
    generation: GenerationId,
    balls: BTreeMap<BallId, Ball>,
    in_hand: VecDeque<BallId>,
    in_air: Vec<BallId>,
    next_id: BallId,
    total_balls: u32,
    duration_minutes: u32,
    target_duration: Duration,
    generation_start: Instant,
    started_at: DateTime<Utc>,
    active: bool,
    finished: bool,
}

impl JugglerState {
    /// The empty, inactive state of a freshly constructed juggler.
    fn empty() -> Self {
        Self {
            generation: GenerationId::default(),
            balls: BTreeMap::new(),
            in_hand: VecDeque::new(),
            in_air: Vec::new(),
            next_id: BallId::FIRST,
            total_balls: 0,
            duration_minutes: 0,
            target_duration: Duration::ZERO,
            generation_start: Instant::now(),
            started_at: Utc::now(),
            active: false,
            finished: true,
        }
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.generation_start)
    }

    fn is_time_over(&self) -> bool {
        self.elapsed() >= self.target_duration
    }

    fn is_running(&self) -> bool {
        self.active && !self.is_time_over()
    }

    /// Move the head of the in-hand queue into the air.
    fn launch_next(&mut self, flight_range: &RangeInclusive<u32>) -> Option<BallId> {
        let ball_id = self.in_hand.pop_front()?;
        let Some(ball) = self.balls.get_mut(&ball_id) else {
            // Queues and map are only ever edited together.
            return None;
        };
        ball.status = BallStatus::InFlight;
        ball.flight_duration_secs = rand::rng().random_range(flight_range.clone());
        ball.elapsed_secs = 0;
        ball.flight_start = Some(Utc::now());
        self.in_air.push(ball_id);

        debug!(
            generation = %self.generation,
            ball = %ball_id,
            flight_secs = ball.flight_duration_secs,
            "Ball thrown"
        );
        Some(ball_id)
    }

    /// Move an airborne ball back to the tail of the in-hand queue.
    fn catch(&mut self, ball_id: BallId) {
        if let Some(pos) = self.in_air.iter().position(|id| *id == ball_id) {
            self.in_air.remove(pos);
        }
        self.in_hand.push_back(ball_id);
        if let Some(ball) = self.balls.get_mut(&ball_id) {
            ball.status = BallStatus::InHand;
            ball.elapsed_secs = 0;
        }
    }
}

/// Shared simulation state.
///
/// Constructed once at startup, wrapped in [`Arc`], and handed to the
/// control surface. Spawned tasks hold their own `Arc` clone.
#[derive(Debug)]
pub struct Juggler {
    state: RwLock<JugglerState>,
    generation_tx: watch::Sender<GenerationId>,
    timing: TimingConfig,
    flight_range: RangeInclusive<u32>,
}

impl Juggler {
    /// Create an empty, inactive juggler with the given timing.
    pub fn new(timing: TimingConfig) -> Self {
        let (generation_tx, _) = watch::channel(GenerationId::default());
        let lo = timing.min_flight_secs.min(timing.max_flight_secs);
        let hi = timing.min_flight_secs.max(timing.max_flight_secs);
        Self {
            state: RwLock::new(JugglerState::empty()),
            generation_tx,
            timing,
            flight_range: lo..=hi,
        }
    }

    /// Timing this juggler was built with.
    pub const fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Subscribe to generation changes.
    pub fn subscribe_generations(&self) -> watch::Receiver<GenerationId> {
        self.generation_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Discard every ball and start a new generation with `total_balls`
    /// balls in hand and a target duration of `duration_minutes`.
    ///
    /// Timers and schedulers of the previous generation are notified and
    /// exit without effect.
    pub async fn reset(&self, total_balls: u32, duration_minutes: u32) -> GenerationId {
        let mut state = self.state.write().await;

        let generation = state.generation.next();
        let mut balls = BTreeMap::new();
        let mut in_hand = VecDeque::with_capacity(usize::try_from(total_balls).unwrap_or(0));
        let mut next_id = BallId::FIRST;
        for _ in 0..total_balls {
            balls.insert(next_id, Ball::in_hand(next_id));
            in_hand.push_back(next_id);
            next_id = next_id.next();
        }

        *state = JugglerState {
            generation,
            balls,
            in_hand,
            in_air: Vec::new(),
            next_id,
            total_balls,
            duration_minutes,
            target_duration: Duration::from_secs(
                u64::from(duration_minutes).saturating_mul(SECS_PER_MINUTE),
            ),
            generation_start: Instant::now(),
            started_at: Utc::now(),
            active: true,
            finished: false,
        };

        // Published under the lock so no task can observe the new state
        // while still believing the old generation is current.
        self.generation_tx.send_replace(generation);

        info!(
            %generation,
            total_balls,
            duration_minutes,
            "Juggler reset"
        );
        generation
    }

    /// Stop issuing throws. Balls already in flight keep flying and are
    /// caught as usual. Idempotent.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if state.active {
            info!(generation = %state.generation, "Juggling stopped");
        }
        state.active = false;
        state.finished = true;
    }

    /// Throw the ball at the head of the in-hand queue.
    ///
    /// Returns `false` without changing anything when no ball is in hand.
    /// On success a flight timer is spawned for the thrown ball.
    pub async fn throw_ball(self: &Arc<Self>) -> bool {
        let mut state = self.state.write().await;
        let generation = state.generation;
        match state.launch_next(&self.flight_range) {
            Some(ball_id) => {
                self.spawn_flight(generation, ball_id);
                true
            }
            None => false,
        }
    }

    /// Spawn the throw scheduler for `generation`, the id returned by the
    /// [`reset`](Self::reset) that configured it.
    ///
    /// The scheduler runs until the generation's duration elapses,
    /// [`stop`](Self::stop) is called, or a reset supersedes it. If
    /// `generation` is already stale the scheduler exits at once.
    pub fn start(self: &Arc<Self>, generation: GenerationId) -> JoinHandle<()> {
        info!(%generation, "Throw scheduler starting");
        tokio::spawn(scheduler::run_throw_scheduler(Arc::clone(self), generation))
    }

    fn spawn_flight(self: &Arc<Self>, generation: GenerationId, ball_id: BallId) {
        drop(tokio::spawn(scheduler::run_flight(
            Arc::clone(self),
            generation,
            ball_id,
        )));
    }

    /// Throw every ball in hand, in queue order, as one transition.
    ///
    /// Returns `None` if `generation` is no longer current.
    pub(crate) async fn throw_all_in_hand(self: &Arc<Self>, generation: GenerationId) -> Option<u32> {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return None;
        }
        let mut thrown: u32 = 0;
        while let Some(ball_id) = state.launch_next(&self.flight_range) {
            self.spawn_flight(generation, ball_id);
            thrown = thrown.saturating_add(1);
        }
        Some(thrown)
    }

    /// Decide whether the scheduler of `generation` must terminate, and
    /// mark the generation finished if it ran out of time or was stopped.
    pub(crate) async fn finish_if_over(&self, generation: GenerationId) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return true;
        }
        if !state.active || state.is_time_over() {
            state.active = false;
            state.finished = true;
            return true;
        }
        false
    }

    /// Advance one ball's flight by a tick, catching it when it lands.
    pub(crate) async fn advance_flight(
        &self,
        generation: GenerationId,
        ball_id: BallId,
    ) -> FlightProgress {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return FlightProgress::Orphaned;
        }
        let Some(ball) = state.balls.get_mut(&ball_id) else {
            return FlightProgress::Orphaned;
        };
        if ball.status != BallStatus::InFlight {
            return FlightProgress::Orphaned;
        }

        ball.elapsed_secs = ball.elapsed_secs.saturating_add(1);
        let elapsed = ball.elapsed_secs;
        let duration = ball.flight_duration_secs;
        trace!(ball = %ball_id, elapsed, duration, "Ball in flight");

        if elapsed >= duration {
            state.catch(ball_id);
            debug!(%generation, ball = %ball_id, "Ball caught");
            FlightProgress::Caught
        } else {
            FlightProgress::Airborne
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Counts of both queues and a copy of every ball.
    pub async fn stats(&self) -> JugglerStats {
        let state = self.state.read().await;
        JugglerStats {
            in_hand: state.in_hand.len(),
            in_air: state.in_air.len(),
            balls: state.balls.values().cloned().collect(),
        }
    }

    /// Everything the dashboard shows, read under a single lock.
    pub async fn snapshot(&self) -> JugglerSnapshot {
        let state = self.state.read().await;
        let is_running = state.is_running();
        JugglerSnapshot {
            in_hand: count_u32(state.in_hand.len()),
            in_air: count_u32(state.in_air.len()),
            balls: state.balls.values().map(BallView::from).collect(),
            time_elapsed: if is_running {
                state.elapsed().as_secs()
            } else {
                0
            },
            is_finished: state.finished,
            is_running,
            total_balls: state.total_balls,
            total_time: state.duration_minutes,
        }
    }

    /// Whether the generation is active and within its target duration.
    pub async fn is_running(&self) -> bool {
        self.state.read().await.is_running()
    }

    /// Whether the scheduler has terminated for this generation.
    pub async fn is_finished(&self) -> bool {
        self.state.read().await.finished
    }

    /// Whether the target duration of the current generation has elapsed.
    pub async fn is_time_over(&self) -> bool {
        self.state.read().await.is_time_over()
    }

    /// Whether no ball is in the air.
    pub async fn all_balls_in_hand(&self) -> bool {
        self.state.read().await.in_air.is_empty()
    }

    /// Configured number of balls.
    pub async fn total_balls(&self) -> u32 {
        self.state.read().await.total_balls
    }

    /// Configured duration of the current generation.
    pub async fn target_duration(&self) -> Duration {
        self.state.read().await.target_duration
    }

    /// Wall-clock time the current generation began.
    pub async fn generation_start(&self) -> DateTime<Utc> {
        self.state.read().await.started_at
    }

    /// Time since the current generation began.
    pub async fn elapsed(&self) -> Duration {
        self.state.read().await.elapsed()
    }

    /// Id of the current generation.
    pub async fn generation(&self) -> GenerationId {
        self.state.read().await.generation
    }

    /// The id the next new ball would receive.
    pub async fn next_ball_id(&self) -> BallId {
        self.state.read().await.next_id
    }

    /// Emit the full state at `trace` level.
    pub async fn log_state(&self) {
        let state = self.state.read().await;
        trace!(
            generation = %state.generation,
            elapsed_secs = state.elapsed().as_secs(),
            in_hand = state.in_hand.len(),
            in_air = state.in_air.len(),
            "Juggling state"
        );
        for ball in state.balls.values() {
            trace!(
                ball = %ball.id,
                status = %ball.status,
                elapsed = ball.elapsed_secs,
                duration = ball.flight_duration_secs,
                "Ball state"
            );
        }
    }
}

impl Default for Juggler {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
