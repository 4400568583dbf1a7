use crate::config::Settings;
use crate::countdown::{Countdown, CountdownId};
use crate::diagnosis::SessionResult;
use crate::error::ConfigError;
use crate::stimulus::{generate_stimuli, sample_stimuli, SizePalette, Stimulus};
use itertools::{Itertools, MinMaxResult};
use rand::Rng;
use std::time::Duration;

pub const ROUNDS_PER_SESSION: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InRound,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Correct,
    Incorrect,
    TimedOut,
}

/// What the presentation layer renders for the current round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub round_index: u32,
    pub target_is_largest: bool,
    pub stimuli: Vec<Stimulus>,
    pub remaining_secs: u32,
}

impl RoundState {
    /// Size of the single letter that answers this round.
    pub fn correct_size(&self) -> Option<u16> {
        match self.stimuli.iter().map(|s| s.size).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(size) => Some(size),
            MinMaxResult::MinMax(min, max) => {
                Some(if self.target_is_largest { max } else { min })
            }
        }
    }

    pub fn correct_index(&self) -> Option<usize> {
        let size = self.correct_size()?;
        self.stimuli.iter().position(|s| s.size == size)
    }
}

/// Drives a fixed-length session: one round at a time, one countdown at a time.
#[derive(Debug)]
pub struct RoundController<R: Rng> {
    settings: Settings,
    palette: SizePalette,
    rng: R,
    phase: Phase,
    score: u32,
    total_elapsed_secs: u64,
    round: Option<RoundState>,
    countdown: Option<Countdown>,
    next_countdown_id: u64,
    outcomes: Vec<RoundOutcome>,
    result: Option<SessionResult>,
}

impl<R: Rng> RoundController<R> {
    pub fn new(settings: Settings, rng: R) -> Result<Self, ConfigError> {
        Self::with_palette(settings, SizePalette::default(), rng)
    }

    pub fn with_palette(
        settings: Settings,
        palette: SizePalette,
        rng: R,
    ) -> Result<Self, ConfigError> {
        settings.validate(&palette)?;
        Ok(Self {
            settings,
            palette,
            rng,
            phase: Phase::Idle,
            score: 0,
            total_elapsed_secs: 0,
            round: None,
            countdown: None,
            next_countdown_id: 0,
            outcomes: Vec::with_capacity(ROUNDS_PER_SESSION as usize),
            result: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn palette(&self) -> &SizePalette {
        &self.palette
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_elapsed_secs(&self) -> u64 {
        self.total_elapsed_secs
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    pub fn round_index(&self) -> u32 {
        self.round.as_ref().map_or(0, |r| r.round_index)
    }

    pub fn active_countdown(&self) -> Option<CountdownId> {
        self.countdown.as_ref().map(Countdown::id)
    }

    /// Remaining time including the fraction of the current second, for display.
    pub fn remaining_display_secs(&self) -> f64 {
        match &self.countdown {
            Some(c) => (c.remaining_secs() as f64 - c.sub_second_progress()).max(0.0),
            None => 0.0,
        }
    }

    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    pub fn session_result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn start_session(&mut self) {
        self.cancel_countdown();
        self.score = 0;
        self.total_elapsed_secs = 0;
        self.round = None;
        self.outcomes.clear();
        self.result = None;
        self.phase = Phase::InRound;
        tracing::info!(
            num_letters = self.settings.num_letters,
            time_limit_secs = self.settings.time_limit_secs,
            difficulty = %self.settings.difficulty,
            "session started"
        );
        self.begin_round();
    }

    pub fn begin_round(&mut self) {
        let round_index = self.round_index();
        if round_index >= ROUNDS_PER_SESSION {
            let result = self.compute_result();
            tracing::info!(
                score = result.score,
                percentage = result.percentage,
                total_elapsed_secs = result.total_elapsed_secs,
                diagnosis = %result.diagnosis,
                "session finished"
            );
            self.result = Some(result);
            self.phase = Phase::Finished;
            return;
        }

        let round_index = round_index + 1;
        // num_letters was validated against this palette in `with_palette`
        let stimuli = sample_stimuli(self.settings.num_letters, &self.palette, &mut self.rng);
        self.round = Some(RoundState {
            round_index,
            target_is_largest: round_index % 2 == 1,
            stimuli,
            remaining_secs: self.settings.time_limit_secs,
        });
        self.phase = Phase::InRound;
        self.start_countdown();
    }

    pub fn generate_stimuli(&mut self, n: usize) -> Result<Vec<Stimulus>, ConfigError> {
        generate_stimuli(n, &self.palette, &mut self.rng)
    }

    /// Feeds wall-clock time to the active countdown, firing one tick per elapsed second.
    pub fn advance(&mut self, dt: Duration) -> Option<RoundOutcome> {
        let (id, due) = match self.countdown.as_mut() {
            Some(c) => (c.id(), c.advance(dt)),
            None => return None,
        };
        for _ in 0..due {
            if let Some(outcome) = self.on_countdown_tick(id) {
                return Some(outcome);
            }
        }
        None
    }

    /// Ticks from a cancelled or replaced countdown are ignored.
    pub fn on_countdown_tick(&mut self, id: CountdownId) -> Option<RoundOutcome> {
        if self.phase != Phase::InRound || self.active_countdown() != Some(id) {
            return None;
        }
        let expired = match self.countdown.as_mut() {
            Some(c) => {
                let expired = c.tick();
                if let Some(round) = self.round.as_mut() {
                    round.remaining_secs = c.remaining_secs();
                }
                expired
            }
            None => false,
        };
        if expired {
            self.on_selection(None)
        } else {
            None
        }
    }

    /// Scores the round and moves on. `None` means nothing was selected in time.
    pub fn on_selection(&mut self, selected_size: Option<u16>) -> Option<RoundOutcome> {
        if self.phase != Phase::InRound {
            return None;
        }
        self.cancel_countdown();

        let round = self.round.as_ref()?;
        let correct_size = round.correct_size();
        let outcome = match selected_size {
            None => RoundOutcome::TimedOut,
            Some(size) if Some(size) == correct_size => RoundOutcome::Correct,
            Some(_) => RoundOutcome::Incorrect,
        };
        if outcome == RoundOutcome::Correct {
            self.score += 1;
        }
        let elapsed = self
            .settings
            .time_limit_secs
            .saturating_sub(round.remaining_secs);
        self.total_elapsed_secs += u64::from(elapsed);

        tracing::debug!(
            round = round.round_index,
            target_is_largest = round.target_is_largest,
            ?selected_size,
            ?correct_size,
            ?outcome,
            elapsed,
            "round complete"
        );

        self.outcomes.push(outcome);
        self.begin_round();
        Some(outcome)
    }

    /// Selects the letter shown at `index`; out-of-range indices are ignored.
    pub fn select_index(&mut self, index: usize) -> Option<RoundOutcome> {
        let size = self.round.as_ref()?.stimuli.get(index)?.size;
        self.on_selection(Some(size))
    }

    pub fn compute_result(&self) -> SessionResult {
        SessionResult::new(self.score, ROUNDS_PER_SESSION, self.total_elapsed_secs)
    }

    fn start_countdown(&mut self) {
        self.cancel_countdown();
        self.next_countdown_id += 1;
        self.countdown = Some(Countdown::new(
            CountdownId::new(self.next_countdown_id),
            self.settings.time_limit_secs,
        ));
    }

    fn cancel_countdown(&mut self) -> Option<Countdown> {
        self.countdown.take()
    }
}
