//! Rate limiting for repeated diagnostics

use std::time::{Duration, Instant};

/// Lets one message through per interval and drops the rest.
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval: Duration,
    last_logged: Option<Instant>,
    logged: u64,
}

impl LogThrottle {
    /// Create a throttle that allows one message per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_logged: None,
            logged: 0,
        }
    }

    /// Check whether a message may be logged at `now`, recording it if so
    pub fn should_log_at(&mut self, now: Instant) -> bool {
        match self.last_logged {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_logged = Some(now);
                self.logged += 1;
                true
            }
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Messages let through so far
    pub fn logged(&self) -> u64 {
        self.logged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_always_logged() {
        let mut throttle = LogThrottle::new(Duration::from_secs(10));
        assert!(throttle.should_log_at(Instant::now()));
    }

    #[test]
    fn test_suppresses_within_interval() {
        let mut throttle = LogThrottle::new(Duration::from_secs(10));
        let start = Instant::now();
        assert!(throttle.should_log_at(start));
        assert!(!throttle.should_log_at(start + Duration::from_secs(1)));
        assert!(!throttle.should_log_at(start + Duration::from_millis(9_999)));
        assert!(throttle.should_log_at(start + Duration::from_secs(10)));
        assert_eq!(throttle.logged(), 2);
    }

    #[test]
    fn test_suppressed_messages_do_not_extend_window() {
        let mut throttle = LogThrottle::new(Duration::from_secs(5));
        let start = Instant::now();
        assert!(throttle.should_log_at(start));
        assert!(!throttle.should_log_at(start + Duration::from_secs(4)));
        // Window is measured from the last emitted message, not the last attempt
        assert!(throttle.should_log_at(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_independent_throttles() {
        let mut consumer = LogThrottle::new(Duration::from_secs(5));
        let mut data = LogThrottle::new(Duration::from_secs(10));
        let start = Instant::now();
        assert!(consumer.should_log_at(start));
        assert!(data.should_log_at(start));
        assert!(consumer.should_log_at(start + Duration::from_secs(6)));
        assert!(!data.should_log_at(start + Duration::from_secs(6)));
    }
}
