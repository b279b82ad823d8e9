//! Core matching-game engine shared by the player-facing screens.
//!
//! Provides:
//! - Deck builder: a shuffled, face-down deck from a level's pair list
//! - Flip/match state machine (flipped buffer, board lock, resolution)
//! - Level progression, scoring, and the one-time completion report
//! - Timing coordination for the delayed transitions (mismatch flip-back,
//!   celebration clear, completion reveal)
//! - An async driver that hosts real timers on tokio
//!
//! The engine is a pure reducer: hosts feed it [`Event`]s and carry out the
//! [`Effect`]s it returns. See [`driver`] for a ready-made host loop.

pub mod board;
pub mod deck;
pub mod driver;
pub mod error;
pub mod session;
pub mod timer;
pub mod types;

pub use board::{Board, FlipOutcome};
pub use driver::{Command, Notification, SessionHandle};
pub use error::{ConfigError, Result};
pub use session::{CardView, Effect, Event, Phase, Session, SessionView};
pub use timer::{Delays, TimerCoordinator, TimerKind, TimerToken};
pub use types::{
    Card, CardId, CardSide, CompletionPolicy, CompletionReport, GameTemplate, Level, Pair,
    ScoringRules,
};
