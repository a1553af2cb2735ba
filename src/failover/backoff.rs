//! Lazy `(endpoint, delay_ms)` sequence generator: exponential back-off
//! with a cap, attempt-capped termination, and shuffle-on-cycle.
//!
//! A `Default`-impl'd options struct, clamped deterministic delay math
//! instead of unbounded float growth, and a small piece of mutable state
//! the caller drives one step at a time rather than a background task.

use rand::seq::SliceRandom;

use crate::failover::error::FailoverError;
use crate::failover::uri::{Endpoint, FailoverOptions, FailoverUri};

/// Drives the reconnect endpoint/delay sequence for one `failover:` URI.
///
/// Yields `(endpoint, delay_ms)` pairs through its `Iterator` impl. The
/// first pair always has delay `0`. `restart()` resets the attempt
/// counter after a successful connect, and also ends the window in which
/// `startupMaxReconnectAttempts` (rather than `maxReconnectAttempts`)
/// governs the cap.
#[derive(Debug, Clone)]
pub struct BackoffSequence {
    endpoints: Vec<Endpoint>,
    options: FailoverOptions,
    cursor: usize,
    attempt: u64,
    has_connected_once: bool,
    exhausted: bool,
}

impl BackoffSequence {
    pub fn new(endpoints: Vec<Endpoint>, options: FailoverOptions) -> Result<Self, FailoverError> {
        if endpoints.is_empty() {
            return Err(FailoverError::InvalidUri("failover endpoint list is empty".to_string()));
        }
        let mut sequence = BackoffSequence {
            endpoints,
            options,
            cursor: 0,
            attempt: 0,
            has_connected_once: false,
            exhausted: false,
        };
        if sequence.options.randomize {
            sequence.shuffle();
        }
        Ok(sequence)
    }

    pub fn from_uri(uri: FailoverUri) -> Result<Self, FailoverError> {
        Self::new(uri.endpoints, uri.options)
    }

    /// Resets the attempt counter and reshuffles (if `randomize`), to be
    /// called once the caller has successfully connected to whichever
    /// endpoint this sequence most recently yielded.
    pub fn restart(&mut self) {
        self.attempt = 0;
        self.cursor = 0;
        self.has_connected_once = true;
        self.exhausted = false;
        if self.options.randomize {
            self.shuffle();
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn shuffle(&mut self) {
        self.endpoints.shuffle(&mut rand::thread_rng());
    }

    fn effective_max_attempts(&self) -> i64 {
        if !self.has_connected_once && self.options.startup_max_reconnect_attempts > 0 {
            self.options.startup_max_reconnect_attempts
        } else {
            self.options.max_reconnect_attempts
        }
    }

    fn delay_for_attempt(&self, attempt: u64) -> u64 {
        if attempt == 0 {
            return 0;
        }
        if !self.options.use_exponential_back_off {
            return self.options.initial_reconnect_delay.min(self.options.max_reconnect_delay);
        }
        let exponent = (attempt - 1) as i32;
        let raw = self.options.initial_reconnect_delay as f64 * self.options.back_off_multiplier.powi(exponent);
        (raw as u64).min(self.options.max_reconnect_delay)
    }
}

impl Iterator for BackoffSequence {
    type Item = (Endpoint, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let cap = self.effective_max_attempts();
        if cap >= 0 && self.attempt >= cap as u64 + 1 {
            self.exhausted = true;
            return None;
        }
        if self.cursor == 0 && self.attempt > 0 && self.options.randomize {
            self.shuffle();
        }
        let endpoint = self.endpoints[self.cursor].clone();
        let delay = self.delay_for_attempt(self.attempt);
        self.cursor = (self.cursor + 1) % self.endpoints.len();
        self.attempt += 1;
        Some((endpoint, delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failover::uri::Scheme;

    fn endpoint(host: &str, port: u16) -> Endpoint {
        Endpoint { scheme: Scheme::Tcp, host: host.to_string(), port }
    }

    fn no_randomize(mut options: FailoverOptions) -> FailoverOptions {
        options.randomize = false;
        options
    }

    #[test]
    fn matches_the_documented_two_endpoint_two_attempt_scenario() {
        let options = no_randomize(FailoverOptions { max_reconnect_attempts: 2, ..FailoverOptions::default() });
        let sequence = BackoffSequence::new(vec![endpoint("a", 1), endpoint("b", 2)], options).unwrap();
        let pairs: Vec<_> = sequence.collect();
        assert_eq!(
            pairs,
            vec![(endpoint("a", 1), 0), (endpoint("b", 2), 10), (endpoint("a", 1), 20)]
        );
    }

    #[test]
    fn zero_max_attempts_yields_exactly_one_pair() {
        let options = no_randomize(FailoverOptions { max_reconnect_attempts: 0, ..FailoverOptions::default() });
        let sequence = BackoffSequence::new(vec![endpoint("a", 1)], options).unwrap();
        let pairs: Vec<_> = sequence.collect();
        assert_eq!(pairs, vec![(endpoint("a", 1), 0)]);
    }

    #[test]
    fn unlimited_attempts_never_exhausts() {
        let options = no_randomize(FailoverOptions::default());
        let mut sequence = BackoffSequence::new(vec![endpoint("a", 1)], options).unwrap();
        let first_twenty: Vec<_> = (0..20).map(|_| sequence.next().unwrap()).collect();
        assert_eq!(first_twenty.len(), 20);
        assert!(!sequence.is_exhausted());
    }

    #[test]
    fn delay_never_exceeds_the_configured_cap() {
        let options = no_randomize(FailoverOptions {
            initial_reconnect_delay: 1000,
            max_reconnect_delay: 5000,
            back_off_multiplier: 10.0,
            ..FailoverOptions::default()
        });
        let mut sequence = BackoffSequence::new(vec![endpoint("a", 1)], options).unwrap();
        let delays: Vec<u64> = (0..6).map(|_| sequence.next().unwrap().1).collect();
        assert!(delays.iter().all(|&delay| delay <= 5000));
        assert_eq!(delays[delays.len() - 1], 5000);
    }

    #[test]
    fn startup_cap_applies_only_before_the_first_successful_connect() {
        let options = no_randomize(FailoverOptions {
            max_reconnect_attempts: -1,
            startup_max_reconnect_attempts: 1,
            ..FailoverOptions::default()
        });
        let mut sequence = BackoffSequence::new(vec![endpoint("a", 1)], options).unwrap();
        assert!(sequence.next().is_some());
        assert!(sequence.next().is_none());
        assert!(sequence.is_exhausted());

        sequence.restart();
        assert!(sequence.next().is_some());
        assert!(sequence.next().is_some());
        assert!(sequence.next().is_some());
        assert!(!sequence.is_exhausted());
    }

    #[test]
    fn use_exponential_back_off_false_repeats_the_initial_delay() {
        let options = no_randomize(FailoverOptions { use_exponential_back_off: false, ..FailoverOptions::default() });
        let mut sequence = BackoffSequence::new(vec![endpoint("a", 1)], options).unwrap();
        sequence.next();
        let second = sequence.next().unwrap().1;
        let third = sequence.next().unwrap().1;
        assert_eq!(second, third);
    }
}
