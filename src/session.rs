//! One play-through of a game: the flip/match machine wired to level
//! progression, scoring, and timer scheduling.
//!
//! The session never sleeps or calls out to the host directly. Every
//! external input arrives as an [`Event`] and every side effect the host
//! must perform leaves as an [`Effect`], so the whole engine is testable
//! without a clock or a renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

use crate::board::{Board, FlipOutcome};
use crate::error::Result;
use crate::timer::{Delays, TimerCoordinator, TimerKind, TimerToken};
use crate::types::{
    CardId, CompletionPolicy, CompletionReport, GameTemplate, ScoringRules,
};

/// Where the session currently is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No unresolved cards; the board is interactive.
    Idle,
    /// One card face-up, awaiting its partner.
    OneFlipped,
    /// Two mismatched cards revealed; the board is locked until the
    /// flip-back timer fires.
    Resolving,
    /// All pairs matched with a further level remaining. Leaving this state
    /// takes an explicit [`Event::AdvanceLevel`].
    LevelComplete,
    /// Terminal: the last level is cleared.
    GameComplete,
}

/// External inputs: player actions and fired timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Flip(CardId),
    AdvanceLevel,
    Restart,
    TimerFired(TimerToken),
}

/// Side effects the host must carry out after handling an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Arm a timer and deliver `Event::TimerFired(timer)` after `delay`.
    /// Replaces any armed timer of the same kind.
    Schedule { timer: TimerToken, delay: Duration },
    /// Disarm every outstanding timer.
    CancelTimers,
    /// Transient celebration signal; presentational only.
    Celebration,
    /// The one-time completion report. Fired at most once per play-through.
    Report(CompletionReport),
}

/// Mutable state of one play-through.
#[derive(Debug, Clone)]
pub struct Session {
    template: GameTemplate,
    policy: CompletionPolicy,
    scoring: ScoringRules,
    delays: Delays,
    board: Board,
    timers: TimerCoordinator,
    phase: Phase,
    level_index: usize,
    score: u32,
    started_at: Option<DateTime<Utc>>,
    celebrating: bool,
    report_sent: bool,
}

impl Session {
    /// Validate the template and start at level 1 with a fresh deck.
    pub fn start(
        template: GameTemplate,
        policy: CompletionPolicy,
        scoring: ScoringRules,
        delays: Delays,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        template.validate()?;
        let board = Board::new(&template.levels[0]);
        debug!(activity = %template.activity_name, levels = template.level_count(), "session started");
        Ok(Self {
            template,
            policy,
            scoring,
            delays,
            board,
            timers: TimerCoordinator::new(),
            phase: Phase::Idle,
            level_index: 0,
            score: 0,
            started_at: Some(now),
            celebrating: false,
            report_sent: false,
        })
    }

    /// The state transition function. Invalid operations are no-ops that
    /// return no effects.
    pub fn handle(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Effect> {
        match event {
            Event::Flip(id) => self.handle_flip(id, now),
            Event::AdvanceLevel => self.handle_advance(),
            Event::Restart => self.handle_restart(),
            Event::TimerFired(token) => self.handle_timer(token, now),
        }
    }

    fn handle_flip(&mut self, id: CardId, now: DateTime<Utc>) -> Vec<Effect> {
        if matches!(self.phase, Phase::LevelComplete | Phase::GameComplete) {
            trace!(?id, phase = ?self.phase, "flip ignored outside play");
            return vec![];
        }
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        match self.board.flip(id) {
            FlipOutcome::Rejected => {
                trace!(?id, "flip rejected");
                vec![]
            }
            FlipOutcome::Flipped => {
                self.phase = Phase::OneFlipped;
                vec![]
            }
            FlipOutcome::Matched {
                pair_id,
                level_cleared,
            } => {
                self.score += self.scoring.match_reward;
                self.celebrating = true;
                self.phase = Phase::Idle;
                debug!(pair_id, score = self.score, level_cleared, "pair matched");
                let mut effects = vec![
                    Effect::Celebration,
                    self.schedule(TimerKind::CelebrationClear),
                ];
                if level_cleared {
                    effects.push(self.schedule(TimerKind::CompletionReveal));
                }
                effects
            }
            FlipOutcome::Mismatched => {
                self.score = self.score.saturating_sub(self.scoring.mismatch_penalty);
                self.phase = Phase::Resolving;
                debug!(score = self.score, "mismatch, board locked");
                vec![self.schedule(TimerKind::MismatchFlipBack)]
            }
        }
    }

    fn handle_timer(&mut self, token: TimerToken, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.timers.accept(token) {
            trace!(kind = ?token.kind, "stale timer ignored");
            return vec![];
        }
        match token.kind {
            TimerKind::MismatchFlipBack => {
                self.board.resolve_mismatch();
                if self.phase == Phase::Resolving {
                    self.phase = Phase::Idle;
                }
                vec![]
            }
            TimerKind::CelebrationClear => {
                self.celebrating = false;
                vec![]
            }
            TimerKind::CompletionReveal => self.reveal_completion(now),
        }
    }

    fn reveal_completion(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        if !self.board.is_cleared() {
            return vec![];
        }
        if self.level_index + 1 < self.template.level_count() {
            self.phase = Phase::LevelComplete;
            debug!(level = self.current_level(), "level complete");
            vec![]
        } else {
            self.phase = Phase::GameComplete;
            if self.report_sent {
                return vec![];
            }
            self.report_sent = true;
            let report = CompletionReport {
                final_score: self.score,
                elapsed_seconds: self.elapsed_seconds(now),
                exp_reward: self.template.max_exp,
            };
            debug!(?report, "game complete");
            vec![Effect::Report(report)]
        }
    }

    fn handle_advance(&mut self) -> Vec<Effect> {
        if self.phase != Phase::LevelComplete {
            trace!(phase = ?self.phase, "advance ignored");
            return vec![];
        }
        let Some(next) = self.template.levels.get(self.level_index + 1) else {
            return vec![];
        };
        // Cancel before touching shared state so a stale flip-back cannot
        // land on the new deck.
        self.timers.cancel_all();
        self.board = Board::new(next);
        self.level_index += 1;
        self.celebrating = false;
        self.phase = Phase::Idle;
        debug!(level = self.current_level(), "advanced to next level");
        vec![Effect::CancelTimers]
    }

    fn handle_restart(&mut self) -> Vec<Effect> {
        if self.policy != CompletionPolicy::Replayable {
            trace!("restart ignored in terminal mode");
            return vec![];
        }
        self.timers.cancel_all();
        self.board = Board::new(&self.template.levels[0]);
        self.level_index = 0;
        self.score = 0;
        self.started_at = None;
        self.celebrating = false;
        self.report_sent = false;
        self.phase = Phase::Idle;
        debug!("session restarted");
        vec![Effect::CancelTimers]
    }

    fn schedule(&mut self, kind: TimerKind) -> Effect {
        Effect::Schedule {
            timer: self.timers.schedule(kind),
            delay: self.delays.for_kind(kind),
        }
    }

    fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.started_at {
            Some(start) => {
                let millis = (now - start).num_milliseconds().max(0);
                (millis as f64 / 1000.0).round() as u64
            }
            None => 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// 1-based number of the level currently in play.
    pub fn current_level(&self) -> u32 {
        self.level_index as u32 + 1
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn template(&self) -> &GameTemplate {
        &self.template
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    /// Title of the upcoming level, present only while in `LevelComplete`.
    pub fn next_level_title(&self) -> Option<&str> {
        if self.phase != Phase::LevelComplete {
            return None;
        }
        self.template
            .levels
            .get(self.level_index + 1)
            .map(|l| l.title.as_str())
    }

    /// Render-ready snapshot for hosts.
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            score: self.score,
            level: self.current_level(),
            level_count: self.template.level_count(),
            level_title: self.template.levels[self.level_index].title.clone(),
            next_level_title: self.next_level_title().map(str::to_string),
            celebrating: self.celebrating,
            cards: self
                .board
                .cards()
                .iter()
                .map(|card| CardView {
                    id: card.id,
                    face_up: card.face_up,
                    matched: card.matched,
                    // Face-down cards keep their content hidden.
                    content: card.face_up.then(|| card.content.clone()),
                    image: if card.face_up { card.image.clone() } else { None },
                })
                .collect(),
        }
    }
}

/// Serializable snapshot of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub level_count: usize,
    pub level_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level_title: Option<String>,
    pub celebrating: bool,
    pub cards: Vec<CardView>,
}

/// One card as the host may render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: CardId,
    pub face_up: bool,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
