//! Timing coordinator: tracks the delayed transitions the engine schedules
//! and guarantees at most one pending timer per kind.
//!
//! The engine never sleeps itself; it hands out generation-tagged tokens and
//! the host fires them back after the requested delay. Cancelling bumps the
//! generation, so a stale callback (a mismatch flip-back scheduled before a
//! level change, say) is rejected instead of mutating a session that has
//! moved on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The kinds of delayed action the engine schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Flip a mismatched pair back face-down.
    MismatchFlipBack,
    /// Clear the transient celebration signal. Purely presentational.
    CelebrationClear,
    /// Reveal the level-complete / game-complete interstitial.
    CompletionReveal,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::MismatchFlipBack,
        TimerKind::CelebrationClear,
        TimerKind::CompletionReveal,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            TimerKind::MismatchFlipBack => 0,
            TimerKind::CelebrationClear => 1,
            TimerKind::CompletionReveal => 2,
        }
    }
}

/// A handle for one scheduled timer. Only the token from the most recent
/// schedule of its kind is accepted back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub kind: TimerKind,
    generation: u64,
}

/// Per-kind generation bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct TimerCoordinator {
    generations: [u64; 3],
    pending: [bool; 3],
}

impl TimerCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending timer of `kind`, invalidating any previous one
    /// of the same kind.
    pub fn schedule(&mut self, kind: TimerKind) -> TimerToken {
        let idx = kind.index();
        self.generations[idx] += 1;
        self.pending[idx] = true;
        TimerToken {
            kind,
            generation: self.generations[idx],
        }
    }

    /// Accept a fired timer. Returns false for stale or already-consumed
    /// tokens; callers must not act on those.
    pub fn accept(&mut self, token: TimerToken) -> bool {
        let idx = token.kind.index();
        if self.pending[idx] && self.generations[idx] == token.generation {
            self.pending[idx] = false;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        let idx = kind.index();
        self.generations[idx] += 1;
        self.pending[idx] = false;
    }

    /// Invalidate every outstanding timer. Called before a level change,
    /// restart, or teardown mutates session state.
    pub fn cancel_all(&mut self) {
        for kind in TimerKind::ALL {
            self.cancel(kind);
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending[kind.index()]
    }
}

/// Host-configurable delays for the scheduled transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Delays {
    /// How long a mismatched pair stays revealed.
    pub mismatch: Duration,
    /// How long the celebration signal stays up.
    pub celebration: Duration,
    /// Pause between clearing the last pair and the completion reveal.
    pub completion: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            mismatch: Duration::from_millis(1000),
            celebration: Duration::from_millis(1200),
            completion: Duration::from_millis(1000),
        }
    }
}

impl Delays {
    pub fn for_kind(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::MismatchFlipBack => self.mismatch,
            TimerKind::CelebrationClear => self.celebration,
            TimerKind::CompletionReveal => self.completion,
        }
    }
}
