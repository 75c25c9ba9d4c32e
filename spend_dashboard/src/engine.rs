//! Runtime driver for the dashboard.
//!
//! [`DashboardEngine::start`] loads the combo options, then spawns a single
//! tokio task (the event loop) that exclusively owns the filter state, the
//! [`RefreshScheduler`], the [`LabelReveal`] sequencer and the view mode.
//! Nothing else mutates them; callers talk to the loop through a
//! [`DashboardHandle`] and observe it through a `watch` channel of
//! [`DashboardView`] snapshots.
//!
//! ## Event sources
//! - fetch timer: `tokio::time::interval`, first tick immediate, rebuilt on
//!   every filter change so the new cycle starts at once;
//! - fetch completions: each fetch runs in its own task and reports back over
//!   a channel, so a hung request never holds up the timers;
//! - commands from the handle;
//! - countdown timer;
//! - the label reveal deadline (a single deadline, re-armed on each trigger).
//!
//! Fetches are never aborted. Stale answers are filtered by the scheduler's
//! sequence guard when they arrive.

use std::{sync::Arc, time::Duration};

use chrono::{Datelike, Local};
use spend_source::{models::FilterSelection, source::SpendSource};
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior, interval, sleep_until},
};

use crate::{
    clock::Clock,
    combo::{ComboOptions, DEFAULT_COMBO_TIMEOUT, OptionsCache, load_combo_options},
    filters::{FilterError, FilterState, initial_selection},
    labels::{DEFAULT_REVEAL_DELAY, LabelReveal},
    scheduler::{ApplyOutcome, FetchCompletion, RefreshScheduler},
    view::DashboardView,
    view_mode::ViewMode,
};

/// Shortest timer period the loop will arm; `tokio::time::interval` rejects zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timing and startup parameters of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub interval: Duration,
    pub countdown_tick: Duration,
    pub label_reveal_delay: Duration,
    /// Year range passed to the month/year listing.
    pub from_year: i32,
    pub to_year: i32,
    /// Upper bound for each option list request at startup.
    pub combo_timeout: Duration,
    /// Preferred initial filters; see [`initial_selection`].
    pub category: Option<String>,
    pub month_year: Option<String>,
    pub mode: ViewMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            countdown_tick: Duration::from_secs(1),
            label_reveal_delay: DEFAULT_REVEAL_DELAY,
            from_year: 2025,
            to_year: Local::now().year(),
            combo_timeout: DEFAULT_COMBO_TIMEOUT,
            category: None,
            month_year: None,
            mode: ViewMode::Daily,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("dashboard engine is stopped")]
    Stopped,
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("dashboard engine task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

type Reply = oneshot::Sender<Result<bool, FilterError>>;

enum Command {
    SetFilters(FilterSelection, Reply),
    SelectCategory(String, Reply),
    SelectMonthYear(String, Reply),
    SetViewMode(ViewMode),
    Stop,
}

pub struct DashboardEngine;

impl DashboardEngine {
    /// Loads the combo options and starts the refresh cycle.
    ///
    /// Option loading is bounded by `settings.combo_timeout`; lists that do not
    /// arrive in time stay empty and the refresh cycle starts anyway.
    /// Must be called from within a tokio runtime.
    pub async fn start(source: Arc<dyn SpendSource>, settings: EngineSettings) -> DashboardHandle {
        let options = load_combo_options(
            &*source,
            settings.from_year,
            settings.to_year,
            settings.combo_timeout,
        )
        .await;
        Self::start_with_options(source, settings, options)
    }

    /// Starts the refresh cycle with options that were loaded elsewhere.
    pub fn start_with_options(
        source: Arc<dyn SpendSource>,
        settings: EngineSettings,
        options: ComboOptions,
    ) -> DashboardHandle {
        let initial = initial_selection(
            settings.category.as_deref(),
            settings.month_year.as_deref(),
            &options,
        );
        tracing::info!(
            filters = %initial,
            mode = %settings.mode,
            interval = ?settings.interval,
            "starting dashboard engine"
        );

        let cache = OptionsCache::new();
        cache.store(options);

        let scheduler = RefreshScheduler::new(initial.clone(), settings.interval);
        let labels = LabelReveal::new(settings.label_reveal_delay);
        let (view_tx, view_rx) = watch::channel(DashboardView::derive(
            &scheduler,
            settings.mode,
            labels.state(),
        ));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let event_loop = EventLoop {
            source,
            filters: FilterState::new(initial, cache.clone()),
            scheduler,
            labels,
            mode: settings.mode,
            clock: Clock::start(),
            settings,
            view_tx,
            commands: commands_rx,
            completions_tx,
            completions: completions_rx,
        };

        DashboardHandle {
            commands: commands_tx,
            view: view_rx,
            options: cache,
            task: tokio::spawn(event_loop.run()),
        }
    }
}

/// Caller side of a running engine.
///
/// Dropping the handle stops the engine.
pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<DashboardView>,
    options: OptionsCache,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    /// Current snapshot.
    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    /// Options offered by the filter selectors.
    pub fn options(&self) -> Arc<ComboOptions> {
        self.options.snapshot()
    }

    /// Replaces both filter keys. `Ok(true)` when a new cycle was started.
    pub async fn set_filters(&self, filters: FilterSelection) -> Result<bool, EngineError> {
        self.request(|reply| Command::SetFilters(filters, reply)).await
    }

    pub async fn select_category(&self, category: impl Into<String>) -> Result<bool, EngineError> {
        let category = category.into();
        self.request(|reply| Command::SelectCategory(category, reply)).await
    }

    pub async fn select_month_year(
        &self,
        month_year: impl Into<String>,
    ) -> Result<bool, EngineError> {
        let month_year = month_year.into();
        self.request(|reply| Command::SelectMonthYear(month_year, reply)).await
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> Result<(), EngineError> {
        self.commands
            .send(Command::SetViewMode(mode))
            .map_err(|_| EngineError::Stopped)
    }

    /// Cancels the refresh cycle and all timers. Safe to call repeatedly.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Stop);
    }

    /// Waits for the event loop to exit.
    pub async fn join(self) -> Result<(), EngineError> {
        self.task.await?;
        Ok(())
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Command) -> Result<bool, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .map_err(|_| EngineError::Stopped)?;
        Ok(rx.await.map_err(|_| EngineError::Stopped)??)
    }
}

struct EventLoop {
    source: Arc<dyn SpendSource>,
    filters: FilterState,
    scheduler: RefreshScheduler,
    labels: LabelReveal,
    mode: ViewMode,
    clock: Clock,
    settings: EngineSettings,
    view_tx: watch::Sender<DashboardView>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl EventLoop {
    async fn run(mut self) {
        let mut fetch_timer = self.fetch_timer();
        let mut countdown = interval(self.settings.countdown_tick.max(MIN_PERIOD));
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let reveal_at = self.labels.pending();
            tokio::select! {
                _ = fetch_timer.tick() => self.issue_fetch(),
                Some(done) = self.completions.recv() => self.on_completion(done),
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        self.shutdown("all handles dropped");
                        break;
                    };
                    if !self.on_command(command, &mut fetch_timer) {
                        break;
                    }
                }
                _ = countdown.tick() => self.on_countdown(),
                _ = sleep_until(reveal_at.unwrap_or_else(Instant::now)), if reveal_at.is_some() => {
                    self.on_reveal();
                }
            }
        }
    }

    fn fetch_timer(&self) -> Interval {
        let mut timer = interval(self.settings.interval.max(MIN_PERIOD));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        timer
    }

    fn issue_fetch(&mut self) {
        let Some(ticket) = self.scheduler.issue(self.clock.now()) else {
            return;
        };
        tracing::debug!(seq = ticket.seq, filters = %ticket.filters, "issuing dashboard fetch");

        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_dashboard(&ticket.filters).await;
            // the loop may be gone by now; nothing left to update then
            let _ = completions.send(FetchCompletion { ticket, result });
        });
    }

    fn on_completion(&mut self, done: FetchCompletion) {
        let seq = done.ticket.seq;
        match self.scheduler.apply(done, self.clock.now()) {
            ApplyOutcome::Applied { records } => {
                tracing::info!(seq, records, "dashboard data landed");
                self.labels.trigger(Instant::now());
                self.publish();
            }
            ApplyOutcome::Empty => {
                tracing::info!(seq, "no data for current filters");
                self.labels.trigger(Instant::now());
                self.publish();
            }
            ApplyOutcome::Failed { consecutive } => {
                tracing::warn!(
                    seq,
                    consecutive,
                    error = self.scheduler.last_error().unwrap_or_default(),
                    "dashboard fetch failed; keeping previous data"
                );
                self.publish();
            }
            ApplyOutcome::Stale => {
                tracing::debug!(seq, "discarding stale dashboard response");
            }
        }
    }

    /// Returns `false` when the loop must exit.
    fn on_command(&mut self, command: Command, fetch_timer: &mut Interval) -> bool {
        match command {
            Command::SetFilters(filters, reply) => {
                let result = self.filters.select(filters);
                self.after_selection(&result, fetch_timer);
                let _ = reply.send(result);
            }
            Command::SelectCategory(category, reply) => {
                let result = self.filters.select_category(category);
                self.after_selection(&result, fetch_timer);
                let _ = reply.send(result);
            }
            Command::SelectMonthYear(month_year, reply) => {
                let result = self.filters.select_month_year(month_year);
                self.after_selection(&result, fetch_timer);
                let _ = reply.send(result);
            }
            Command::SetViewMode(mode) => self.on_view_mode(mode),
            Command::Stop => {
                self.shutdown("stop requested");
                return false;
            }
        }
        true
    }

    fn after_selection(&mut self, result: &Result<bool, FilterError>, fetch_timer: &mut Interval) {
        match result {
            Ok(true) => {
                let filters = self.filters.selection().clone();
                tracing::info!(%filters, "filters changed; restarting refresh cycle");
                self.scheduler.set_filters(filters);
                *fetch_timer = self.fetch_timer();
                self.publish();
            }
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "filter selection rejected"),
        }
    }

    fn on_view_mode(&mut self, mode: ViewMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(%mode, "view mode changed");
        self.mode = mode;
        self.labels.trigger(Instant::now());
        self.publish();
    }

    fn on_countdown(&mut self) {
        if self.scheduler.tick_countdown(self.clock.now()) {
            let refresh = self.scheduler.refresh().clone();
            self.view_tx.send_modify(|view| view.refresh = refresh);
        }
    }

    fn on_reveal(&mut self) {
        if self.labels.advance(Instant::now()) {
            let labels = self.labels.state();
            self.view_tx.send_modify(|view| view.labels = labels);
        }
    }

    fn shutdown(&mut self, reason: &str) {
        if self.scheduler.stop() {
            tracing::info!(reason, "dashboard engine stopped");
            self.publish();
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(DashboardView::derive(
            &self.scheduler,
            self.mode,
            self.labels.state(),
        ));
    }
}
