//! The conversation state machine: `Idle → Submitting → Generating → Idle`.
//!
//! A submit appends the user's message synchronously and schedules the
//! acknowledgment. When the acknowledgment fires it appends a generating
//! assistant message and schedules completion, which rewrites that same
//! message in place and returns to idle. While a turn is in flight further
//! submissions are rejected with [`SubmitError::Busy`].

use std::mem;
use std::sync::mpsc;
use std::time::Duration;

use dy_protocol::{ConversationEvent, Message};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scheduler::{ManualScheduler, Scheduler, Timer, TimerId, TimerPhase};
use crate::script::SimulatorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("input is empty")]
    EmptyInput,
    #[error("a response is still being generated")]
    Busy,
}

/// Externally visible state of the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Submitting,
    Generating,
}

/// Plain copy of the transcript for renderers that poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptSnapshot {
    pub messages: Vec<Message>,
    pub is_building: bool,
    pub phase: Phase,
}

#[derive(Debug)]
enum TurnState {
    Idle,
    /// Waiting for the acknowledgment timer.
    Submitting { input: String },
    /// Waiting for the completion timer; `index` is the message to rewrite.
    Generating { index: usize },
}

pub struct Conversation<S: Scheduler> {
    config: SimulatorConfig,
    scheduler: S,
    messages: Vec<Message>,
    draft: String,
    state: TurnState,
    /// Bumped on reset so timers from a torn-down session are ignored.
    session: u64,
    pending: Option<TimerId>,
    subscribers: Vec<mpsc::Sender<ConversationEvent>>,
}

impl<S: Scheduler> Conversation<S> {
    pub fn new(config: SimulatorConfig, scheduler: S) -> Self {
        let messages = config.initial_transcript();
        Self {
            config,
            scheduler,
            messages,
            draft: String::new(),
            state: TurnState::Idle,
            session: 0,
            pending: None,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            TurnState::Idle => Phase::Idle,
            TurnState::Submitting { .. } => Phase::Submitting,
            TurnState::Generating { .. } => Phase::Generating,
        }
    }

    /// True from submission until the completion update lands.
    pub fn is_building(&self) -> bool {
        self.phase() != Phase::Idle
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the send action is enabled for the current draft.
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty() && !self.is_building()
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            messages: self.messages.clone(),
            is_building: self.is_building(),
            phase: self.phase(),
        }
    }

    /// Receive every change from now on. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<ConversationEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Submit `text` as the user's next message.
    ///
    /// On success the user message is already in the transcript, the draft
    /// is cleared, and the acknowledgment timer is scheduled. On error
    /// nothing changed.
    pub fn submit(&mut self, text: &str) -> Result<(), SubmitError> {
        if text.trim().is_empty() {
            debug!("ignoring blank submission");
            return Err(SubmitError::EmptyInput);
        }
        if self.is_building() {
            debug!(phase = ?self.phase(), "rejecting submission while busy");
            return Err(SubmitError::Busy);
        }

        let index = self.messages.len();
        self.messages.push(Message::user(text));
        self.emit(ConversationEvent::MessageAppended {
            index,
            message: self.messages[index].clone(),
        });
        self.draft.clear();

        self.state = TurnState::Submitting {
            input: text.to_string(),
        };
        self.emit(ConversationEvent::BuildingChanged { building: true });

        let delay = self.config.initial_delay();
        self.schedule(delay, TimerPhase::Acknowledge);
        debug!(session = self.session, ?delay, "submitted; awaiting acknowledgment");
        Ok(())
    }

    /// Submit the current draft.
    pub fn submit_draft(&mut self) -> Result<(), SubmitError> {
        let text = self.draft.clone();
        self.submit(&text)
    }

    /// Apply a fired timer. Returns false if the timer was stale and ignored.
    pub fn fire(&mut self, id: TimerId, timer: Timer) -> bool {
        if timer.session != self.session || self.pending != Some(id) {
            debug!(?id, ?timer, session = self.session, "discarding stale timer");
            return false;
        }
        self.pending = None;

        match (mem::replace(&mut self.state, TurnState::Idle), timer.phase) {
            (TurnState::Submitting { input }, TimerPhase::Acknowledge) => {
                let index = self.messages.len();
                self.messages
                    .push(Message::generating(self.config.acknowledge(&input)));
                self.emit(ConversationEvent::MessageAppended {
                    index,
                    message: self.messages[index].clone(),
                });
                self.state = TurnState::Generating { index };

                let delay = self.config.completion_delay();
                self.schedule(delay, TimerPhase::Complete);
                debug!(session = self.session, index, ?delay, "acknowledged; generating");
                true
            }
            (TurnState::Generating { index }, TimerPhase::Complete) => {
                if let Some(message) = self.messages.get_mut(index) {
                    message.is_generating = false;
                    message.content = self.config.completion.clone();
                    let message = message.clone();
                    self.emit(ConversationEvent::MessageUpdated { index, message });
                }
                self.emit(ConversationEvent::BuildingChanged { building: false });
                debug!(session = self.session, index, "generation complete");
                true
            }
            (state, phase) => {
                warn!(?state, ?phase, "timer phase does not match turn state");
                self.state = state;
                false
            }
        }
    }

    /// Tear the session down: cancel any pending timer and restore the
    /// initial transcript. Timers from before the reset are ignored if they
    /// still arrive.
    pub fn reset(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel(id);
        }
        let was_building = self.is_building();

        self.session += 1;
        self.state = TurnState::Idle;
        self.draft.clear();
        self.messages = self.config.initial_transcript();

        self.emit(ConversationEvent::Reset {
            messages: self.messages.clone(),
        });
        if was_building {
            self.emit(ConversationEvent::BuildingChanged { building: false });
        }
        debug!(session = self.session, "session reset");
    }

    fn schedule(&mut self, delay: Duration, phase: TimerPhase) {
        let timer = Timer {
            session: self.session,
            phase,
        };
        self.pending = Some(self.scheduler.after(delay, timer));
    }

    fn emit(&mut self, event: ConversationEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Conversation<ManualScheduler> {
    /// A conversation on a virtual clock.
    pub fn with_manual_clock(config: SimulatorConfig) -> Self {
        Self::new(config, ManualScheduler::new())
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Advance virtual time by `by`, firing every timer that falls due,
    /// including timers scheduled by earlier fires within the window.
    /// Returns the number of timers applied.
    pub fn advance(&mut self, by: Duration) -> usize {
        let target = self.scheduler.now() + by;
        let mut applied = 0;
        while let Some((id, timer)) = self.scheduler.pop_due(target) {
            if self.fire(id, timer) {
                applied += 1;
            }
        }
        self.scheduler.advance_to(target);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dy_protocol::Role;

    const FIRST: Duration = Duration::from_millis(600);
    const SECOND: Duration = Duration::from_millis(2000);

    fn conversation() -> Conversation<ManualScheduler> {
        Conversation::with_manual_clock(SimulatorConfig::default())
    }

    #[test]
    fn starts_idle_with_greeting() {
        let conv = conversation();
        assert_eq!(conv.phase(), Phase::Idle);
        assert!(!conv.is_building());
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role, Role::Assistant);
    }

    #[test]
    fn submit_appends_user_message_immediately() {
        let mut conv = conversation();
        conv.submit("build a landing page").unwrap();

        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[1], Message::user("build a landing page"));
        assert_eq!(conv.phase(), Phase::Submitting);
        assert!(conv.is_building());
        assert_eq!(conv.pending_timers(), 1);
    }

    #[test]
    fn acknowledgment_arrives_after_first_delay() {
        let mut conv = conversation();
        conv.submit("todo app").unwrap();

        assert_eq!(conv.advance(FIRST - Duration::from_millis(1)), 0);
        assert_eq!(conv.messages().len(), 2);

        assert_eq!(conv.advance(Duration::from_millis(1)), 1);
        assert_eq!(conv.messages().len(), 3);
        let last = &conv.messages()[2];
        assert_eq!(last.role, Role::Assistant);
        assert!(last.is_generating);
        assert!(last.content.contains("\"todo app\""));
        assert_eq!(conv.phase(), Phase::Generating);
    }

    #[test]
    fn completion_rewrites_acknowledgment_in_place() {
        let mut conv = conversation();
        conv.submit("todo app").unwrap();
        conv.advance(FIRST);
        let acknowledged = conv.messages()[2].content.clone();

        conv.advance(SECOND);
        assert_eq!(conv.messages().len(), 3);
        let last = &conv.messages()[2];
        assert!(!last.is_generating);
        assert_ne!(last.content, acknowledged);
        assert_eq!(last.content, conv.config().completion);
        assert_eq!(conv.phase(), Phase::Idle);
        assert!(!conv.is_building());
        assert_eq!(conv.pending_timers(), 0);
    }

    #[test]
    fn single_advance_runs_both_phases() {
        let mut conv = conversation();
        conv.submit("x").unwrap();

        assert_eq!(conv.advance(FIRST + SECOND), 2);
        assert_eq!(conv.now(), FIRST + SECOND);
        assert!(!conv.is_building());
    }

    #[test]
    fn completion_delay_measured_from_acknowledgment() {
        let mut conv = conversation();
        conv.submit("x").unwrap();
        conv.advance(FIRST + Duration::from_millis(300));
        assert_eq!(conv.phase(), Phase::Generating);

        conv.advance(SECOND - Duration::from_millis(301));
        assert_eq!(conv.phase(), Phase::Generating);

        conv.advance(Duration::from_millis(1));
        assert_eq!(conv.phase(), Phase::Idle);
    }

    #[test]
    fn blank_input_is_rejected_without_change() {
        let mut conv = conversation();
        assert_eq!(conv.submit(""), Err(SubmitError::EmptyInput));
        assert_eq!(conv.submit("   \n\t"), Err(SubmitError::EmptyInput));
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.pending_timers(), 0);
        assert!(!conv.is_building());
    }

    #[test]
    fn busy_rejects_in_both_phases() {
        let mut conv = conversation();
        conv.submit("first").unwrap();

        assert_eq!(conv.submit("second"), Err(SubmitError::Busy));
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.pending_timers(), 1);

        conv.advance(FIRST);
        assert_eq!(conv.submit("third"), Err(SubmitError::Busy));
        assert_eq!(conv.messages().len(), 3);
        assert_eq!(conv.pending_timers(), 1);

        conv.advance(SECOND);
        conv.submit("fourth").unwrap();
        assert_eq!(conv.messages().len(), 4);
    }

    #[test]
    fn draft_is_cleared_on_success_only() {
        let mut conv = conversation();
        conv.set_draft("   ");
        assert!(!conv.can_submit());
        assert_eq!(conv.submit_draft(), Err(SubmitError::EmptyInput));
        assert_eq!(conv.draft(), "   ");

        conv.set_draft("make it blue");
        assert!(conv.can_submit());
        conv.submit_draft().unwrap();
        assert_eq!(conv.draft(), "");
        assert_eq!(conv.messages()[1].content, "make it blue");

        conv.set_draft("queued thought");
        assert!(!conv.can_submit());
        assert_eq!(conv.submit_draft(), Err(SubmitError::Busy));
        assert_eq!(conv.draft(), "queued thought");
    }

    #[test]
    fn user_content_is_kept_verbatim() {
        let mut conv = conversation();
        conv.submit("  padded  ").unwrap();
        assert_eq!(conv.messages()[1].content, "  padded  ");
    }

    #[test]
    fn events_follow_transitions() {
        let mut conv = conversation();
        let events = conv.subscribe();

        conv.submit("hi").unwrap();
        conv.advance(FIRST + SECOND);

        let got: Vec<_> = events.try_iter().collect();
        assert_eq!(got.len(), 5);
        assert_eq!(
            got[0],
            ConversationEvent::MessageAppended {
                index: 1,
                message: Message::user("hi")
            }
        );
        assert_eq!(got[1], ConversationEvent::BuildingChanged { building: true });
        assert!(matches!(
            &got[2],
            ConversationEvent::MessageAppended { index: 2, message } if message.is_generating
        ));
        assert!(matches!(
            &got[3],
            ConversationEvent::MessageUpdated { index: 2, message } if !message.is_generating
        ));
        assert_eq!(got[4], ConversationEvent::BuildingChanged { building: false });
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut conv = conversation();
        let events = conv.subscribe();
        drop(events);
        conv.submit("hi").unwrap();
        assert!(conv.subscribers.is_empty());
    }

    #[test]
    fn reset_cancels_pending_turn() {
        let mut conv = conversation();
        let events = conv.subscribe();
        conv.submit("hi").unwrap();
        conv.advance(FIRST);

        conv.reset();
        assert_eq!(conv.phase(), Phase::Idle);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.pending_timers(), 0);

        assert_eq!(conv.advance(SECOND * 2), 0);
        assert_eq!(conv.messages().len(), 1);

        let last = events.try_iter().last();
        assert_eq!(last, Some(ConversationEvent::BuildingChanged { building: false }));
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut conv = conversation();
        conv.submit("hi").unwrap();
        let stale = Timer {
            session: 0,
            phase: TimerPhase::Acknowledge,
        };
        conv.reset();

        let mut sched = ManualScheduler::new();
        let foreign = sched.after(Duration::ZERO, stale);
        assert!(!conv.fire(foreign, stale));
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn unexpected_timer_id_is_ignored() {
        let mut conv = conversation();
        conv.submit("hi").unwrap();

        let mut other = ManualScheduler::new();
        other.after(Duration::ZERO, Timer { session: 9, phase: TimerPhase::Complete });
        let unknown = other.after(
            Duration::ZERO,
            Timer {
                session: 0,
                phase: TimerPhase::Complete,
            },
        );
        assert!(!conv.fire(
            unknown,
            Timer {
                session: 0,
                phase: TimerPhase::Complete
            }
        ));
        assert_eq!(conv.phase(), Phase::Submitting);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut conv = conversation();
        conv.submit("hi").unwrap();
        let snap = conv.snapshot();
        assert!(snap.is_building);
        assert_eq!(snap.phase, Phase::Submitting);
        assert_eq!(snap.messages.len(), 2);
    }
}
