//! Async host adapter: owns a [`Session`], turns host commands into engine
//! events, arms real timers for [`Effect::Schedule`], and streams
//! render-ready snapshots back to the host.
//!
//! One slot exists per [`TimerKind`]; re-arming a slot drops the stale
//! sleep, which together with the session's generation tokens keeps the
//! at-most-one-pending-per-kind contract.

use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};
use tracing::debug;

use crate::session::{Effect, Event, Session, SessionView};
use crate::timer::TimerToken;
use crate::types::{CardId, CompletionReport};

/// Host requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Flip(CardId),
    AdvanceLevel,
    Restart,
}

/// What the driver publishes to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Fresh snapshot after every processed event.
    Snapshot(SessionView),
    /// Transient celebration signal.
    Celebration,
    /// The one-time completion report.
    Completed(CompletionReport),
}

struct PendingTimer {
    token: TimerToken,
    sleep: Pin<Box<Sleep>>,
}

#[derive(Default)]
struct TimerSlots {
    slots: [Option<PendingTimer>; 3],
}

impl TimerSlots {
    fn arm(&mut self, token: TimerToken, delay: Duration) {
        self.slots[token.kind.index()] = Some(PendingTimer {
            token,
            sleep: Box::pin(sleep(delay)),
        });
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Resolves with the token of the next timer to expire. Pends forever
    /// while no timer is armed.
    async fn expired(&mut self) -> TimerToken {
        poll_fn(|cx| {
            for slot in &mut self.slots {
                let fired = match slot {
                    Some(pending) => pending.sleep.as_mut().poll(cx).is_ready(),
                    None => false,
                };
                if fired {
                    if let Some(pending) = slot.take() {
                        return Poll::Ready(pending.token);
                    }
                }
            }
            Poll::Pending
        })
        .await
    }
}

/// Cheap cloneable handle for sending commands to a running driver.
/// Dropping every handle shuts the driver down.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub fn flip(&self, id: CardId) {
        let _ = self.commands.send(Command::Flip(id));
    }

    pub fn advance_level(&self) {
        let _ = self.commands.send(Command::AdvanceLevel);
    }

    pub fn restart(&self) {
        let _ = self.commands.send(Command::Restart);
    }
}

/// Spawn a driver task for `session`, returning the command handle and the
/// notification stream.
pub fn spawn(session: Session) -> (SessionHandle, mpsc::UnboundedReceiver<Notification>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (notification_tx, notification_rx) = mpsc::unbounded_channel();
    tokio::spawn(run(session, command_rx, notification_tx));
    (
        SessionHandle {
            commands: command_tx,
        },
        notification_rx,
    )
}

/// The driver loop: the single-threaded cooperative event loop of the
/// engine. Each command or fired timer is processed to completion before
/// the next one is looked at.
pub async fn run(
    mut session: Session,
    mut commands: mpsc::UnboundedReceiver<Command>,
    notifications: mpsc::UnboundedSender<Notification>,
) {
    let mut timers = TimerSlots::default();
    let _ = notifications.send(Notification::Snapshot(session.view()));

    loop {
        let effects = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Flip(id)) => session.handle(Event::Flip(id), Utc::now()),
                Some(Command::AdvanceLevel) => session.handle(Event::AdvanceLevel, Utc::now()),
                Some(Command::Restart) => session.handle(Event::Restart, Utc::now()),
                None => {
                    debug!("all handles dropped, session torn down");
                    break;
                }
            },
            token = timers.expired() => session.handle(Event::TimerFired(token), Utc::now()),
        };

        for effect in effects {
            match effect {
                Effect::Schedule { timer, delay } => timers.arm(timer, delay),
                Effect::CancelTimers => timers.clear(),
                Effect::Celebration => {
                    let _ = notifications.send(Notification::Celebration);
                }
                Effect::Report(report) => {
                    let _ = notifications.send(Notification::Completed(report));
                }
            }
        }

        if notifications
            .send(Notification::Snapshot(session.view()))
            .is_err()
        {
            break;
        }
    }
}
