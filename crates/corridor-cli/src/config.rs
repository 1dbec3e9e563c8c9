//! Replay configuration from environment.

use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Seconds represented by one recorded poll.
    pub poll_period_secs: f64,
    /// A sample this far (feet) from the entity's previous sample starts a
    /// new flight with a fresh follower.
    pub reacquire_distance_ft: f64,
    /// An entity is forgotten at the start of the poll this many polls after
    /// its last sample, so it may miss one poll fewer and keep its flight.
    pub stale_after_polls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_period_secs: 0.2,
            reacquire_distance_ft: 500.0,
            stale_after_polls: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_period_secs: env::var("CORRIDOR_POLL_PERIOD_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_period_secs),
            reacquire_distance_ft: env::var("CORRIDOR_REACQUIRE_FT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.reacquire_distance_ft),
            stale_after_polls: env::var("CORRIDOR_STALE_AFTER_POLLS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.stale_after_polls),
        }
    }

    /// Apply command line overrides on top of this configuration.
    pub fn with_overrides(
        mut self,
        poll_period_secs: Option<f64>,
        reacquire_distance_ft: Option<f64>,
        stale_after_polls: Option<u32>,
    ) -> Self {
        if let Some(period) = poll_period_secs {
            self.poll_period_secs = period;
        }
        if let Some(distance) = reacquire_distance_ft {
            self.reacquire_distance_ft = distance;
        }
        if let Some(polls) = stale_after_polls {
            self.stale_after_polls = polls;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let config = Config::default().with_overrides(Some(1.0), None, Some(3));
        assert_eq!(config.poll_period_secs, 1.0);
        assert_eq!(config.reacquire_distance_ft, 500.0);
        assert_eq!(config.stale_after_polls, 3);
    }
}
