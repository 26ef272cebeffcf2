//! Per-room runtime counters owned exclusively by the worker (§3).

use modbridge_types::command_timer::Timer;

/// Message counter and round-robin timer cursor for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCounters {
    message_count: u32,
    timer_cursor: usize,
}

impl RoomCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage C (§4.3): increment the message counter; once it exceeds `max`
    /// and the timer list is non-empty, advance the cursor *before*
    /// returning the pointed-to timer, and reset the counter (P4).
    pub fn tick<'a>(&mut self, timers: &'a [Timer], max: u32) -> Option<(usize, &'a Timer)> {
        self.message_count += 1;
        if self.message_count <= max || timers.is_empty() {
            return None;
        }
        self.timer_cursor = (self.timer_cursor + 1) % timers.len();
        self.message_count = 0;
        Some((self.timer_cursor, &timers[self.timer_cursor]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timers(n: usize) -> Vec<Timer> {
        (0..n)
            .map(|i| Timer {
                message: format!("t{i}"),
                attachment_id: None,
            })
            .collect()
    }

    #[test]
    fn monotonic_rotation_starts_at_t1() {
        let ts = timers(3);
        let mut c = RoomCounters::new();
        // counter_max = 2: three ticks push it over.
        assert!(c.tick(&ts, 2).is_none());
        assert!(c.tick(&ts, 2).is_none());
        let (idx, t) = c.tick(&ts, 2).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(t.message, "t1");
    }

    #[test]
    fn rotation_wraps_around() {
        let ts = timers(3);
        let mut c = RoomCounters::new();
        for _ in 0..3 {
            c.tick(&ts, 2);
        }
        let first = c.tick(&ts, 2);
        assert!(first.is_none());
        let second = c.tick(&ts, 2).unwrap();
        assert_eq!(second.0, 2);
        for _ in 0..2 {
            c.tick(&ts, 2);
        }
        let wrapped = c.tick(&ts, 2).unwrap();
        assert_eq!(wrapped.0, 0);
    }

    #[test]
    fn empty_timer_list_never_fires() {
        let ts = timers(0);
        let mut c = RoomCounters::new();
        for _ in 0..10 {
            assert!(c.tick(&ts, 1).is_none());
        }
    }

    #[test]
    fn counter_resets_after_fire() {
        let ts = timers(2);
        let mut c = RoomCounters::new();
        c.tick(&ts, 2);
        c.tick(&ts, 2);
        c.tick(&ts, 2); // fires, resets to 0
        assert!(c.tick(&ts, 2).is_none());
        assert!(c.tick(&ts, 2).is_none());
        assert!(c.tick(&ts, 2).is_some());
    }
}
