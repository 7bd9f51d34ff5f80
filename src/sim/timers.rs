//! Deferred one-shot events keyed by a monotonic stage clock
//!
//! Owned by the active stage and swept on teardown, so nothing scheduled
//! can fire into a world that no longer exists.

use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredEvent {
    /// Leave the stage after the goal was reached
    AdvanceStage,
    /// Leave the stage after a confirmed death
    GameOver,
    /// Clear the hit-flash read-out
    EndHitFlash,
}

/// Handle returned by [`Timers::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    id: TimerId,
    fire_at: f64,
    event: DeferredEvent,
}

/// Cancellable timer registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    now: f64,
    next_id: u32,
    pending: Vec<Pending>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_secs: f32, event: DeferredEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            fire_at: self.now + delay_secs.max(0.0) as f64,
            event,
        });
        id
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, event: DeferredEvent) -> bool {
        self.pending.iter().any(|p| p.event == event)
    }

    /// Advance the clock and return due events, earliest first (ties by schedule order)
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredEvent> {
        self.now += dt as f64;
        let now = self.now;
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.fire_at <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.id.cmp(&b.id)));
        due.into_iter().map(|p| p.event).collect()
    }

    /// Cancel everything (teardown)
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelled {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_deadline() {
        let mut timers = Timers::new();
        timers.schedule(1.0, DeferredEvent::AdvanceStage);
        assert!(timers.advance(0.5).is_empty());
        assert_eq!(timers.advance(0.5), vec![DeferredEvent::AdvanceStage]);
        assert!(timers.advance(10.0).is_empty());
    }

    #[test]
    fn test_ordering_by_deadline_then_schedule_order() {
        let mut timers = Timers::new();
        timers.schedule(0.8, DeferredEvent::GameOver);
        timers.schedule(0.2, DeferredEvent::EndHitFlash);
        timers.schedule(0.8, DeferredEvent::AdvanceStage);
        assert_eq!(
            timers.advance(1.0),
            vec![
                DeferredEvent::EndHitFlash,
                DeferredEvent::GameOver,
                DeferredEvent::AdvanceStage
            ]
        );
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        let id = timers.schedule(0.1, DeferredEvent::EndHitFlash);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.advance(1.0).is_empty());
    }

    #[test]
    fn test_clear_on_teardown() {
        let mut timers = Timers::new();
        timers.schedule(0.1, DeferredEvent::GameOver);
        timers.schedule(0.2, DeferredEvent::EndHitFlash);
        assert_eq!(timers.len(), 2);
        timers.clear();
        assert!(timers.is_empty());
        assert!(timers.advance(1.0).is_empty());
    }
}
