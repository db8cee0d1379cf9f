use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Server-side timestamp source for the tracking ledger.
///
/// Never returns a value older than the previous one, even if the wall clock steps back.
#[derive(Debug, Default)]
pub struct ServerClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    fn observe(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(previous) if previous > wall => previous,
            _ => wall,
        };
        *last = Some(next);
        next
    }
}
