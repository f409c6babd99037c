//! One-shot timers
//!
//! Deadlines are polled from the frame loop; due actions are handed back to the
//! caller in deadline order, so nothing ever runs outside the main control flow.

use std::time::{Duration, Instant};

use super::clock::SharedClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer<A> {
    id: TimerId,
    deadline: Instant,
    action: A,
}

pub struct TimerQueue<A> {
    clock: SharedClock,
    timers: Vec<Timer<A>>,
    next_id: u64,
}

impl<A> TimerQueue<A> {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            timers: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedules `action` to become due after `delay`
    pub fn schedule(&mut self, delay: Duration, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline: self.clock.now() + delay,
            action,
        });
        id
    }

    /// Cancels a pending timer, returning its action if it had not fired
    pub fn cancel(&mut self, id: TimerId) -> Option<A> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(index).action)
    }

    /// Removes and returns every action whose deadline has passed
    pub fn drain_due(&mut self) -> Vec<A> {
        let now = self.clock.now();
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.deadline <= now);
        self.timers = pending;

        due.sort_by_key(|t| (t.deadline, t.id.0));
        due.into_iter().map(|t| t.action).collect()
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use std::rc::Rc;

    #[test]
    fn test_due_actions_come_back_in_deadline_order() {
        let clock = ManualClock::new();
        let mut timers = TimerQueue::new(Rc::new(clock.clone()));
        timers.schedule(Duration::from_millis(8000), "tutorial");
        timers.schedule(Duration::from_millis(2000), "loading");

        clock.advance_ms(1999);
        assert!(timers.drain_due().is_empty());

        clock.advance_ms(1);
        assert_eq!(timers.drain_due(), vec!["loading"]);

        clock.advance_ms(10_000);
        assert_eq!(timers.drain_due(), vec!["tutorial"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let clock = ManualClock::new();
        let mut timers = TimerQueue::new(Rc::new(clock.clone()));
        let id = timers.schedule(Duration::from_millis(10), 1);

        assert_eq!(timers.cancel(id), Some(1));
        assert_eq!(timers.cancel(id), None);
        clock.advance_ms(20);
        assert!(timers.drain_due().is_empty());
    }
}
