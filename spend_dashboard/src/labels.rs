//! Delayed reveal of the chart value labels.
//!
//! Labels are hidden as soon as new data lands or the view mode changes, and
//! come back after a fixed delay. A retrigger inside the delay replaces the
//! single pending deadline, so only the last trigger ever reveals.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Delay between the last trigger and the reveal.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelVisibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone)]
pub struct LabelReveal {
    state: LabelVisibility,
    pending: Option<Instant>,
    delay: Duration,
}

impl LabelReveal {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: LabelVisibility::Hidden,
            pending: None,
            delay,
        }
    }

    pub fn state(&self) -> LabelVisibility {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == LabelVisibility::Visible
    }

    /// Deadline of the pending reveal, if any.
    pub fn pending(&self) -> Option<Instant> {
        self.pending
    }

    /// Hides the labels and (re)arms the reveal `delay` after `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.state = LabelVisibility::Hidden;
        self.pending = Some(now + self.delay);
    }

    /// Reveals the labels if the pending deadline has passed.
    ///
    /// Returns `true` only on the Hidden → Visible transition.
    pub fn advance(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                self.state = LabelVisibility::Visible;
                true
            }
            _ => false,
        }
    }
}

impl Default for LabelReveal {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn starts_hidden_without_pending_reveal() {
        let mut labels = LabelReveal::default();
        assert_eq!(labels.state(), LabelVisibility::Hidden);
        assert!(labels.pending().is_none());
        assert!(!labels.advance(Instant::now()));
    }

    #[test]
    fn reveals_after_delay() {
        let t0 = Instant::now();
        let mut labels = LabelReveal::default();
        labels.trigger(t0);

        assert!(!labels.advance(t0 + ms(1599)));
        assert!(!labels.is_visible());
        assert!(labels.advance(t0 + ms(1600)));
        assert!(labels.is_visible());
        // no second transition without a new trigger
        assert!(!labels.advance(t0 + ms(5000)));
    }

    #[test]
    fn retrigger_restarts_the_delay() {
        let t0 = Instant::now();
        let mut labels = LabelReveal::default();
        labels.trigger(t0);
        labels.trigger(t0 + ms(1000));

        let transitions = [1600, 2000, 2599, 2600, 4000]
            .into_iter()
            .filter(|at| labels.advance(t0 + ms(*at)))
            .collect::<Vec<_>>();
        assert_eq!(transitions, [2600]);
    }

    #[test]
    fn trigger_hides_visible_labels() {
        let t0 = Instant::now();
        let mut labels = LabelReveal::new(ms(10));
        labels.trigger(t0);
        labels.advance(t0 + ms(10));
        assert!(labels.is_visible());

        labels.trigger(t0 + ms(20));
        assert_eq!(labels.state(), LabelVisibility::Hidden);
        assert_eq!(labels.pending(), Some(t0 + ms(30)));
    }
}
