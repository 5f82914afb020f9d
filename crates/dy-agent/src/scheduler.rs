//! One-shot timers behind a small trait.
//!
//! A timer carries a typed payload instead of a closure: when it fires, the
//! owner hands the payload back to the conversation, which decides whether
//! it is still relevant. This keeps state mutation in one place and makes
//! cancellation a matter of forgetting an id.

use std::collections::HashMap;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies a scheduled timer. Ids are never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Which step of the simulated response a timer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Append the acknowledgment message.
    Acknowledge,
    /// Replace the acknowledgment with the completion text.
    Complete,
}

/// Payload delivered when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// Session generation the timer was scheduled in.
    pub session: u64,
    pub phase: TimerPhase,
}

/// Schedules one-shot timers.
pub trait Scheduler {
    /// Arrange for `timer` to fire once `delay` has elapsed.
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId;

    /// Cancel a pending timer. Returns false if it already fired or is unknown.
    fn cancel(&mut self, id: TimerId) -> bool;
}

#[derive(Debug)]
struct Scheduled {
    id: TimerId,
    deadline: Duration,
    timer: Timer,
}

/// Virtual clock for deterministic tests. Nothing fires until the owner
/// pulls due timers with [`ManualScheduler::pop_due`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|s| s.deadline).min()
    }

    /// Remove the earliest timer due at or before `until`, moving the clock
    /// to its deadline. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Timer)> {
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.deadline <= until)
            .min_by_key(|(_, s)| (s.deadline, s.id))
            .map(|(i, _)| i)?;

        let scheduled = self.pending.remove(pos);
        self.now = self.now.max(scheduled.deadline);
        Some((scheduled.id, scheduled.timer))
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            deadline: self.now + delay,
            timer,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }
}

/// Receiving side of a [`TokioScheduler`]: fired timers arrive here.
pub type FiredTimers = mpsc::UnboundedReceiver<(TimerId, Timer)>;

/// Real-time scheduler: one tokio task per timer, delivering through a channel.
pub struct TokioScheduler {
    handle: Handle,
    next_id: u64,
    tx: mpsc::UnboundedSender<(TimerId, Timer)>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> (Self, FiredTimers) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            handle,
            next_id: 0,
            tx,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }

    /// Number of timer tasks still sleeping.
    pub fn outstanding(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        let id = TimerId(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session was dropped.
            let _ = tx.send((id, timer));
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        match self.tasks.remove(&id) {
            Some(task) => {
                let was_running = !task.is_finished();
                task.abort();
                was_running
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
