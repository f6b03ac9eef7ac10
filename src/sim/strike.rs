//! Lightning strike timeline
//!
//! A strike is a thunder clap, a short lead, then a bolt flickering a random
//! number of times with random gaps. The whole schedule is drawn up front so
//! a strike replays identically for a given seed.
//!
//! Each strike also carries a tuning "duration". The flicker schedule is not
//! fitted to it: it is kept as an approximate budget and only reported when
//! the schedule overruns it.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::STRIKE_LEAD_TIME;
use crate::tuning::StrikeTuning;
use crate::{random_between, random_count};

/// Which bolt visual is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bolt {
    /// Scene-wide flash used at level start and at the safe zone
    Ambient,
    /// One of the bolts that hit the player
    Player(usize),
}

/// Presentation cues for the renderer and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrikeEvent {
    /// Effect container shown at `anchor`, thunder plays
    Started { bolt: Bolt, anchor: Vec2 },
    BoltVisible { bolt: Bolt, visible: bool },
    /// Container hidden
    Finished { bolt: Bolt },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Pending,
    Lead,
    On(u32),
    Off(u32),
    Done,
}

#[derive(Debug, Clone)]
pub struct StrikeSequence {
    bolt: Bolt,
    anchor: Vec2,
    budget: f32,
    flicker_on: f32,
    flickers: u32,
    /// Gap after each flash except the last
    off_times: Vec<f32>,
    step: Step,
    remaining: f32,
}

impl StrikeSequence {
    pub fn new(
        bolt: Bolt,
        target: Vec2,
        budget: f32,
        tuning: &StrikeTuning,
        rng: &mut Pcg32,
    ) -> Self {
        let flickers = random_count(rng, tuning.min_flicker, tuning.max_flicker);
        let off_times = (1..flickers)
            .map(|_| random_between(rng, tuning.min_flicker_off, tuning.max_flicker_off))
            .collect();

        let strike = Self {
            bolt,
            anchor: target + Vec2::new(0.0, tuning.y_offset),
            budget,
            flicker_on: tuning.flicker_on,
            flickers,
            off_times,
            step: Step::Pending,
            remaining: 0.0,
        };

        let planned = strike.planned_duration();
        if planned > budget {
            log::debug!(
                "Strike {:?} schedule {:.3}s exceeds budget {:.3}s",
                bolt,
                planned,
                budget
            );
        }
        strike
    }

    pub fn bolt(&self) -> Bolt {
        self.bolt
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn budget(&self) -> f32 {
        self.budget
    }

    pub fn flicker_count(&self) -> u32 {
        self.flickers
    }

    /// Lead + all flashes + all gaps
    pub fn planned_duration(&self) -> f32 {
        STRIKE_LEAD_TIME
            + self.flicker_on * self.flicker_count() as f32
            + self.off_times.iter().sum::<f32>()
    }

    pub fn is_finished(&self) -> bool {
        self.step == Step::Done
    }

    /// Advance the timeline, returns true once finished
    pub fn tick(&mut self, dt: f32, out: &mut Vec<StrikeEvent>) -> bool {
        if self.step == Step::Pending {
            out.push(StrikeEvent::Started {
                bolt: self.bolt,
                anchor: self.anchor,
            });
            self.step = Step::Lead;
            self.remaining = STRIKE_LEAD_TIME;
        }

        let mut left = dt;
        while self.step != Step::Done {
            if self.remaining > left {
                self.remaining -= left;
                break;
            }
            left -= self.remaining;
            self.advance(out);
        }
        self.is_finished()
    }

    fn advance(&mut self, out: &mut Vec<StrikeEvent>) {
        let bolt = self.bolt;
        self.step = match self.step {
            Step::Pending | Step::Lead if self.flickers == 0 => {
                out.push(StrikeEvent::Finished { bolt });
                Step::Done
            }
            Step::Pending | Step::Lead => {
                out.push(StrikeEvent::BoltVisible { bolt, visible: true });
                self.remaining = self.flicker_on;
                Step::On(0)
            }
            Step::On(i) => {
                out.push(StrikeEvent::BoltVisible { bolt, visible: false });
                match self.off_times.get(i as usize) {
                    Some(&off) => {
                        self.remaining = off;
                        Step::Off(i)
                    }
                    None => {
                        out.push(StrikeEvent::Finished { bolt });
                        Step::Done
                    }
                }
            }
            Step::Off(i) => {
                out.push(StrikeEvent::BoltVisible { bolt, visible: true });
                self.remaining = self.flicker_on;
                Step::On(i + 1)
            }
            Step::Done => Step::Done,
        };
    }

    /// Stop early, hiding whatever is showing
    pub fn cancel(&mut self, out: &mut Vec<StrikeEvent>) {
        let bolt = self.bolt;
        match self.step {
            Step::Pending | Step::Done => {}
            Step::On(_) => {
                out.push(StrikeEvent::BoltVisible { bolt, visible: false });
                out.push(StrikeEvent::Finished { bolt });
            }
            Step::Lead | Step::Off(_) => out.push(StrikeEvent::Finished { bolt }),
        }
        self.step = Step::Done;
    }
}
