use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_millis(10_000);
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// Timing of the completion poll loop.
///
/// The wait grows by one base interval every two attempts and is capped:
/// 2s, 2s, 4s, 4s, 6s, 6s, 8s, 8s, 10s, 10s, 10s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    base_interval: Duration,
    max_interval: Duration,
    max_attempts: u32,
}

impl PollPolicy {
    pub fn new(base_interval: Duration, max_interval: Duration, max_attempts: u32) -> Self {
        Self {
            base_interval,
            max_interval,
            max_attempts,
        }
    }

    pub fn base_interval(&self) -> Duration {
        self.base_interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait after the 0-indexed `attempt` returned a non-terminal status.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let step = attempt / 2 + 1;
        self.base_interval
            .saturating_mul(step)
            .min(self.max_interval)
    }

    /// Sum of every wait the loop can perform before giving up. No wait
    /// follows the final attempt.
    pub fn total_budget(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|a| self.delay_for(a))
            .sum()
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_POLL_INTERVAL,
            DEFAULT_MAX_POLL_INTERVAL,
            DEFAULT_MAX_POLL_ATTEMPTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_steps_every_two_attempts() {
        let policy = PollPolicy::default();
        let secs: Vec<u64> = (0..12).map(|a| policy.delay_for(a).as_secs()).collect();

        assert_eq!(secs, vec![2, 2, 4, 4, 6, 6, 8, 8, 10, 10, 10, 10]);
    }

    #[test]
    fn test_delay_matches_formula() {
        let policy = PollPolicy::default();

        for n in 0..60u32 {
            let expected = (2000 * (n / 2 + 1) as u64).min(10_000);
            assert_eq!(policy.delay_for(n), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), DEFAULT_MAX_POLL_INTERVAL);
    }

    #[test]
    fn test_default_budget_is_bounded() {
        // 2+2+4+4+6+6+8+8 = 40s, then 51 waits of 10s
        assert_eq!(PollPolicy::default().total_budget(), Duration::from_secs(550));
    }
}
