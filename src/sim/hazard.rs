//! Storm countdown sequencer
//!
//! One epoch runs: initial delay, an opening strike, a countdown, then either
//! the player reaches the safe zone or lightning finds them. Every wait is an
//! explicit timer advanced by `tick`, so cancelling is just a phase change.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::progress::ProgressCounter;
use super::strike::{Bolt, StrikeEvent, StrikeSequence};
use crate::random_between;
use crate::tuning::{HazardTuning, StrikeTuning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPhase {
    InitialDelay,
    InitialStrike,
    CountdownRunning,
    /// Inside the spawn buffer: ordinary spawns halted
    SafeSpawnWindow,
    /// Countdown hit zero; the final strike starts next tick
    Expired,
    FinalStrike,
    /// Player is sheltered. Absorbing, outcome already Win.
    SafeZoneReached,
    Resolved(Outcome),
}

/// Coarse countdown view for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    Idle,
    Running,
    SafeSpawnTriggered,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardEvent {
    CountdownStarted { duration: f32 },
    /// Seconds left, never negative
    TimeRemaining(f32),
    /// Stop ordinary spawning for the rest of the epoch
    HaltSpawns,
    SpawnSafeObject,
    Strike(StrikeEvent),
    /// Lightning is about to hit the player
    Burnt,
    Resolved(Outcome),
}

/// What the sequencer reads from the level each tick
pub struct HazardContext<'a> {
    pub progress: &'a mut ProgressCounter,
    pub avg_spawn_interval: f32,
    pub player_pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct HazardSequencer {
    config: HazardTuning,
    strike_config: StrikeTuning,
    phase: HazardPhase,
    delay_remaining: f32,
    countdown_duration: f32,
    countdown_remaining: f32,
    halted: bool,
    safe_requested: bool,
    strike: Option<StrikeSequence>,
}

impl HazardSequencer {
    pub fn new(config: HazardTuning, strike_config: StrikeTuning) -> Self {
        let delay_remaining = config.initial_strike_delay;
        Self {
            config,
            strike_config,
            phase: HazardPhase::InitialDelay,
            delay_remaining,
            countdown_duration: 0.0,
            countdown_remaining: 0.0,
            halted: false,
            safe_requested: false,
            strike: None,
        }
    }

    pub fn phase(&self) -> HazardPhase {
        self.phase
    }

    pub fn countdown_state(&self) -> CountdownState {
        match self.phase {
            HazardPhase::InitialDelay | HazardPhase::InitialStrike => CountdownState::Idle,
            HazardPhase::CountdownRunning => CountdownState::Running,
            HazardPhase::SafeSpawnWindow if self.safe_requested => {
                CountdownState::SafeSpawnTriggered
            }
            HazardPhase::SafeSpawnWindow => CountdownState::Running,
            HazardPhase::Expired | HazardPhase::FinalStrike => CountdownState::Expired,
            HazardPhase::SafeZoneReached | HazardPhase::Resolved(_) => {
                if self.safe_requested {
                    CountdownState::SafeSpawnTriggered
                } else {
                    CountdownState::Idle
                }
            }
        }
    }

    /// Win or Lose once decided
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            HazardPhase::SafeZoneReached => Some(Outcome::Win),
            HazardPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn time_remaining(&self) -> f32 {
        self.countdown_remaining.max(0.0)
    }

    pub fn countdown_duration(&self) -> f32 {
        self.countdown_duration
    }

    pub fn safe_object_requested(&self) -> bool {
        self.safe_requested
    }

    pub fn spawns_halted(&self) -> bool {
        self.halted
    }

    pub fn strike(&self) -> Option<&StrikeSequence> {
        self.strike.as_ref()
    }

    pub fn tick(
        &mut self,
        dt: f32,
        ctx: HazardContext<'_>,
        rng: &mut Pcg32,
        out: &mut Vec<HazardEvent>,
    ) {
        let strike_done = self.advance_strike(dt, out);

        match self.phase {
            HazardPhase::InitialDelay => {
                self.delay_remaining -= dt;
                if self.delay_remaining <= 0.0 {
                    log::info!("Storm rolling in");
                    self.start_strike(
                        Bolt::Ambient,
                        ctx.player_pos,
                        self.strike_config.initial_duration,
                        rng,
                    );
                    self.phase = HazardPhase::InitialStrike;
                }
            }
            HazardPhase::InitialStrike => {
                if strike_done {
                    self.start_countdown(ctx, rng, out);
                }
            }
            HazardPhase::CountdownRunning | HazardPhase::SafeSpawnWindow => {
                self.run_countdown(dt, ctx.progress, out);
            }
            HazardPhase::Expired => {
                let bolt = self.pick_player_bolt(rng);
                log::info!("Countdown expired, striking player");
                out.push(HazardEvent::Burnt);
                self.start_strike(bolt, ctx.player_pos, self.strike_config.player_duration, rng);
                self.phase = HazardPhase::FinalStrike;
            }
            HazardPhase::FinalStrike => {
                if strike_done {
                    self.phase = HazardPhase::Resolved(Outcome::Lose);
                    out.push(HazardEvent::Resolved(Outcome::Lose));
                }
            }
            HazardPhase::SafeZoneReached | HazardPhase::Resolved(_) => {}
        }
    }

    fn run_countdown(&mut self, dt: f32, progress: &ProgressCounter, out: &mut Vec<HazardEvent>) {
        self.countdown_remaining -= dt;
        out.push(HazardEvent::TimeRemaining(self.time_remaining()));

        if self.countdown_remaining <= 0.0 {
            if !self.safe_requested {
                log::info!("Countdown expired before the safe object was earned");
            }
            self.phase = HazardPhase::Expired;
            return;
        }

        if self.countdown_remaining > self.config.spawn_buffer {
            return;
        }

        if !self.halted {
            self.halted = true;
            self.phase = HazardPhase::SafeSpawnWindow;
            out.push(HazardEvent::HaltSpawns);
        }
        if !self.safe_requested && progress.threshold_met() {
            log::info!(
                "Pass threshold met ({}/{}), requesting safe object",
                progress.total_passed(),
                progress.estimated_total()
            );
            self.safe_requested = true;
            out.push(HazardEvent::SpawnSafeObject);
        }
    }

    fn start_countdown(
        &mut self,
        ctx: HazardContext<'_>,
        rng: &mut Pcg32,
        out: &mut Vec<HazardEvent>,
    ) {
        let duration = random_between(rng, self.config.min_countdown, self.config.max_countdown);
        self.countdown_duration = duration;
        self.countdown_remaining = duration;
        ctx.progress
            .reset(ProgressCounter::estimate(duration, ctx.avg_spawn_interval));
        self.phase = HazardPhase::CountdownRunning;
        log::info!("Countdown started: {:.1}s", duration);
        out.push(HazardEvent::CountdownStarted { duration });
        out.push(HazardEvent::TimeRemaining(duration));
    }

    fn pick_player_bolt(&self, rng: &mut Pcg32) -> Bolt {
        let count = self.strike_config.player_bolt_count;
        if count == 0 {
            log::warn!("No player bolts configured, using the ambient bolt");
            return Bolt::Ambient;
        }
        Bolt::Player(rng.random_range(0..count))
    }

    fn start_strike(&mut self, bolt: Bolt, target: Vec2, budget: f32, rng: &mut Pcg32) {
        self.strike = Some(StrikeSequence::new(
            bolt,
            target,
            budget,
            &self.strike_config,
            rng,
        ));
    }

    /// Returns true if a strike finished during this tick
    fn advance_strike(&mut self, dt: f32, out: &mut Vec<HazardEvent>) -> bool {
        let Some(strike) = &mut self.strike else {
            return false;
        };
        let mut events = Vec::new();
        let finished = strike.tick(dt, &mut events);
        out.extend(events.into_iter().map(HazardEvent::Strike));
        if finished {
            self.strike = None;
        }
        finished
    }

    fn cancel_strike(&mut self, out: &mut Vec<HazardEvent>) {
        if let Some(mut strike) = self.strike.take() {
            let mut events = Vec::new();
            strike.cancel(&mut events);
            out.extend(events.into_iter().map(HazardEvent::Strike));
        }
    }

    /// Player reached shelter. Wins over an expired countdown or a final
    /// strike already in flight.
    pub fn enter_safe_zone(&mut self, at: Vec2, rng: &mut Pcg32, out: &mut Vec<HazardEvent>) {
        if self.is_resolved() {
            log::warn!("Safe zone entered after the epoch was resolved, ignoring");
            return;
        }

        log::info!("Safe zone reached during {:?}", self.phase);
        self.cancel_strike(out);
        self.delay_remaining = 0.0;
        if !self.halted {
            self.halted = true;
            out.push(HazardEvent::HaltSpawns);
        }
        self.phase = HazardPhase::SafeZoneReached;
        out.push(HazardEvent::Resolved(Outcome::Win));
        self.start_strike(Bolt::Ambient, at, self.strike_config.safe_zone_duration, rng);
    }

    /// Cancel everything and start over from the initial delay
    pub fn reset_epoch(&mut self, progress: &mut ProgressCounter, out: &mut Vec<HazardEvent>) {
        self.cancel_strike(out);
        self.phase = HazardPhase::InitialDelay;
        self.delay_remaining = self.config.initial_strike_delay;
        self.countdown_duration = 0.0;
        self.countdown_remaining = 0.0;
        self.halted = false;
        self.safe_requested = false;
        progress.reset(0);
        out.push(HazardEvent::TimeRemaining(0.0));
        log::info!("Epoch reset");
    }
}
