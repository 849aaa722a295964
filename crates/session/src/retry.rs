use std::time::Duration;

use waygate_transport::DisconnectReason;

/// What to do about a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up: erase the session.
    Stop,
    /// Wait, then re-run the initialize sequence.
    RetryAfter(Duration),
}

/// Pure reconnect policy: maps a disconnect reason and the attempt count of
/// the current episode to a decision. No hidden state.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Reconnect attempts allowed per disconnect episode.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn decide(&self, reason: DisconnectReason, retry_count: u32) -> RetryDecision {
        // Reasons that can never succeed without fresh pairing.
        if matches!(
            reason,
            DisconnectReason::LoggedOut | DisconnectReason::BadSession | DisconnectReason::Replaced
        ) {
            return RetryDecision::Stop;
        }
        if retry_count >= self.max_retries {
            return RetryDecision::Stop;
        }
        RetryDecision::RetryAfter(self.delay)
    }
}
