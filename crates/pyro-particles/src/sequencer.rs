//! Style rotation ("random wave")
//!
//! Cycles through a shuffled permutation of styles. A wave runs for a fixed
//! or randomized duration; when it ends the sequencer stops advancing and
//! waits, in `Transitioning`, until every particle and in-flight shell of the
//! old style is gone. Only then does it hand the next style to the effect.
//! The wait is polled once per frame and never blocks.

use crate::behavior::Style;
use crate::tuning::WaveConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A drain running longer than this is reported once as a stall
pub const STALL_WARN_SECS: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequencerState {
    /// Showing the style at this index of the permutation
    Steady(usize),
    /// Wave over; waiting for the pool to drain before showing this index
    Transitioning(usize),
}

/// What is still on screen, sampled only while transitioning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Population {
    pub alive: usize,
    pub in_flight: usize,
}

impl Population {
    pub fn is_drained(&self) -> bool {
        self.alive == 0 && self.in_flight == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SequencerDiagnostics {
    /// Completed style hand-offs
    pub transitions: u64,
    /// Ticks spent waiting for a drain, across all transitions
    pub stall_ticks: u64,
    /// Seconds the current (or last) transition has been draining
    pub transition_time: f32,
    /// Completed passes through the permutation
    pub cycles: u64,
}

pub struct StyleSequencer {
    order: Vec<Style>,
    state: SequencerState,
    /// Seconds into the current wave
    elapsed: f32,
    /// Length of the current wave when randomized
    wave_duration: f32,
    stall_reported: bool,
    diagnostics: SequencerDiagnostics,
}

impl StyleSequencer {
    /// Shuffle `styles` into a fresh permutation.
    ///
    /// If `current` takes part in the rotation it becomes the first entry, so
    /// turning rotation on does not change what is on screen. Otherwise the
    /// sequencer starts drain-gated toward the first entry.
    pub fn new<R: Rng + ?Sized>(styles: &[Style], current: Style, wave: &WaveConfig, rng: &mut R) -> Self {
        let mut order = styles.to_vec();
        if order.is_empty() {
            order.push(Style::DEFAULT);
        }
        order.shuffle(rng);

        let state = match order.iter().position(|s| *s == current) {
            Some(pos) => {
                order.swap(0, pos);
                SequencerState::Steady(0)
            }
            None => SequencerState::Transitioning(0),
        };

        let sequencer = Self {
            order,
            state,
            elapsed: 0.0,
            wave_duration: pick_duration(wave, rng),
            stall_reported: false,
            diagnostics: SequencerDiagnostics::default(),
        };
        tracing::debug!(
            "style rotation over {} styles, first wave {:.1}s",
            sequencer.order.len(),
            sequencer.wave_duration
        );
        sequencer
    }

    /// Advance by `dt` seconds. Returns the style to activate when a
    /// transition completes.
    ///
    /// `population` is only evaluated while transitioning.
    pub fn tick<F, R>(&mut self, dt: f32, population: F, wave: &WaveConfig, rng: &mut R) -> Option<Style>
    where
        F: FnOnce() -> Population,
        R: Rng + ?Sized,
    {
        match self.state {
            SequencerState::Steady(index) => {
                // A one-style rotation has nothing to hand off to
                if self.order.len() < 2 {
                    return None;
                }
                self.elapsed += dt;
                let duration = if wave.randomize {
                    self.wave_duration
                } else {
                    wave.duration
                };
                if self.elapsed >= duration {
                    let next = if index + 1 >= self.order.len() {
                        self.reshuffle(rng);
                        0
                    } else {
                        index + 1
                    };
                    self.begin_transition(next);
                }
                None
            }
            SequencerState::Transitioning(next) => {
                self.diagnostics.transition_time += dt;
                if population().is_drained() {
                    self.state = SequencerState::Steady(next);
                    self.elapsed = 0.0;
                    self.wave_duration = pick_duration(wave, rng);
                    self.diagnostics.transitions += 1;
                    return Some(self.order[next]);
                }
                self.diagnostics.stall_ticks += 1;
                if !self.stall_reported && self.diagnostics.transition_time > STALL_WARN_SECS {
                    self.stall_reported = true;
                    tracing::warn!(
                        "style transition to '{}' still draining after {:.0}s",
                        self.order[next],
                        self.diagnostics.transition_time
                    );
                }
                None
            }
        }
    }

    fn begin_transition(&mut self, next: usize) {
        tracing::debug!("wave over, draining before '{}'", self.order[next]);
        self.state = SequencerState::Transitioning(next);
        self.diagnostics.transition_time = 0.0;
        self.stall_reported = false;
    }

    /// New permutation for the next cycle, never starting with the style that
    /// ended the last one
    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let last = self.order[self.order.len() - 1];
        self.order.shuffle(rng);
        if self.order.len() > 1 && self.order[0] == last {
            let swap_with = rng.gen_range(1..self.order.len());
            self.order.swap(0, swap_with);
        }
        self.diagnostics.cycles += 1;
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, SequencerState::Transitioning(_))
    }

    /// The style a transition is waiting to show
    pub fn pending_style(&self) -> Option<Style> {
        match self.state {
            SequencerState::Transitioning(next) => Some(self.order[next]),
            SequencerState::Steady(_) => None,
        }
    }

    /// The current permutation
    pub fn order(&self) -> &[Style] {
        &self.order
    }

    /// Seconds into the current wave
    pub fn wave_elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn diagnostics(&self) -> &SequencerDiagnostics {
        &self.diagnostics
    }
}

fn pick_duration<R: Rng + ?Sized>(wave: &WaveConfig, rng: &mut R) -> f32 {
    if wave.randomize && wave.duration_max > wave.duration_min {
        rng.gen_range(wave.duration_min..=wave.duration_max)
    } else if wave.randomize {
        wave.duration_min
    } else {
        wave.duration
    }
}
