//! Refresh scheduler state machine.
//!
//! [`RefreshScheduler`] owns the raw record list, the [`RefreshState`] and the
//! request sequence counters. It performs no I/O and keeps no timers: the
//! engine asks it for a [`FetchTicket`] when a fetch is due and hands back a
//! [`FetchCompletion`] when the source answers. Everything here is plain
//! transition functions, so the ordering rules can be tested without a
//! runtime.
//!
//! ## Sequence guard
//! Every ticket carries a monotonically increasing `seq`. A completion is
//! accepted only when
//! - its `seq` is at least the first sequence number issued for the current
//!   filters (`cycle_floor`), and
//! - its `seq` is higher than any completion observed so far.
//!
//! Anything else is stale and dropped, whatever order the network delivers
//! responses in.
//!
//! ## Timestamps
//! `last_fetch_at` is the issue time of the accepted fetch and
//! `next_fetch_at = last_fetch_at + interval`, matching an interval timer that
//! is anchored at fetch start rather than completion.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use spend_source::{
    models::{FilterSelection, SpendRecord},
    source::SourceError,
};

use crate::countdown::remaining_ms;

/// Last/next fetch timestamps and the live countdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshState {
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub next_fetch_at: Option<DateTime<Utc>>,
    pub remaining_ms: u64,
}

/// What the current record list means for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    /// No successful fetch yet for the current filters.
    #[default]
    Loading,
    /// The last accepted fetch returned records.
    Ready,
    /// The last accepted fetch succeeded with zero records.
    Empty,
}

/// A fetch the engine should issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub filters: FilterSelection,
    pub issued_at: DateTime<Utc>,
}

/// A ticket together with the source's answer.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Vec<SpendRecord>, SourceError>,
}

/// Result of handing a completion to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Records replaced; `records` is the new count (> 0).
    Applied { records: usize },
    /// Successful fetch with no records.
    Empty,
    /// Fetch failed; previous records kept.
    Failed { consecutive: u32 },
    /// Superseded by a newer request or older than the current filters.
    Stale,
}

pub struct RefreshScheduler {
    filters: FilterSelection,
    interval: TimeDelta,
    records: Vec<SpendRecord>,
    refresh: RefreshState,
    status: DashboardStatus,
    last_error: Option<String>,
    consecutive_failures: u32,
    next_seq: u64,
    cycle_floor: u64,
    last_observed: u64,
    running: bool,
}

impl RefreshScheduler {
    pub fn new(filters: FilterSelection, interval: Duration) -> Self {
        Self {
            filters,
            interval: TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX),
            records: Vec::new(),
            refresh: RefreshState::default(),
            status: DashboardStatus::Loading,
            last_error: None,
            consecutive_failures: 0,
            next_seq: 1,
            cycle_floor: 1,
            last_observed: 0,
            running: true,
        }
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn records(&self) -> &[SpendRecord] {
        &self.records
    }

    pub fn refresh(&self) -> &RefreshState {
        &self.refresh
    }

    pub fn status(&self) -> DashboardStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Allocates the next sequence number for the current filters.
    ///
    /// Returns `None` once stopped.
    pub fn issue(&mut self, now: DateTime<Utc>) -> Option<FetchTicket> {
        if !self.running {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(FetchTicket {
            seq,
            filters: self.filters.clone(),
            issued_at: now,
        })
    }

    fn is_stale(&self, seq: u64) -> bool {
        !self.running || seq < self.cycle_floor || seq <= self.last_observed
    }

    /// Applies a completion if the sequence guard accepts it.
    pub fn apply(&mut self, completion: FetchCompletion, now: DateTime<Utc>) -> ApplyOutcome {
        let FetchCompletion { ticket, result } = completion;
        if self.is_stale(ticket.seq) {
            return ApplyOutcome::Stale;
        }
        self.last_observed = ticket.seq;

        match result {
            Ok(records) => {
                self.refresh.last_fetch_at = Some(ticket.issued_at);
                self.refresh.next_fetch_at = ticket.issued_at.checked_add_signed(self.interval);
                self.refresh.remaining_ms = remaining_ms(self.refresh.next_fetch_at, now);
                self.last_error = None;
                self.consecutive_failures = 0;

                self.records = records;
                if self.records.is_empty() {
                    self.status = DashboardStatus::Empty;
                    ApplyOutcome::Empty
                } else {
                    self.status = DashboardStatus::Ready;
                    ApplyOutcome::Applied {
                        records: self.records.len(),
                    }
                }
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.consecutive_failures += 1;
                ApplyOutcome::Failed {
                    consecutive: self.consecutive_failures,
                }
            }
        }
    }

    /// Switches to new filters. Returns `false` if nothing changed.
    ///
    /// A change invalidates the record list and every fetch issued so far.
    pub fn set_filters(&mut self, filters: FilterSelection) -> bool {
        if filters == self.filters {
            return false;
        }
        self.filters = filters;
        self.records.clear();
        self.status = DashboardStatus::Loading;
        self.last_error = None;
        self.consecutive_failures = 0;
        self.cycle_floor = self.next_seq;
        self.refresh.next_fetch_at = None;
        self.refresh.remaining_ms = 0;
        true
    }

    /// Recomputes the countdown. Returns `true` if it changed.
    pub fn tick_countdown(&mut self, now: DateTime<Utc>) -> bool {
        if !self.running {
            return false;
        }
        let remaining = remaining_ms(self.refresh.next_fetch_at, now);
        let changed = remaining != self.refresh.remaining_ms;
        self.refresh.remaining_ms = remaining;
        changed
    }

    /// Stops issuing and accepting fetches. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }
}
