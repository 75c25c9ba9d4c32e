#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use spend_dashboard::{DashboardView, EngineSettings, ViewMode};
use spend_source::{
    models::{Amount, FilterSelection, SpendRecord},
    source::{ApiSnafu, SourceError, SpendSource},
};
use tokio::{sync::watch, time::Instant};

/// How the fake answers one dashboard fetch.
pub enum Reply {
    Records(Vec<SpendRecord>),
    Fail(&'static str),
    /// Never completes.
    Hang,
}

/// In-memory [`SpendSource`] with per-category latency and scripted replies.
#[derive(Default)]
pub struct FakeSource {
    categories: Vec<String>,
    month_years: Vec<String>,
    fail_combos: bool,
    hang_categories: bool,
    delays: Mutex<HashMap<String, Duration>>,
    scripts: Mutex<HashMap<FilterSelection, VecDeque<Reply>>>,
    data: Mutex<HashMap<FilterSelection, Vec<SpendRecord>>>,
    calls: Mutex<Vec<(Instant, FilterSelection)>>,
}

impl FakeSource {
    pub fn new(categories: &[&str], month_years: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            month_years: month_years.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_combos() -> Self {
        Self {
            fail_combos: true,
            ..Self::default()
        }
    }

    /// The category list never answers.
    pub fn with_hanging_categories(mut self) -> Self {
        self.hang_categories = true;
        self
    }

    pub fn with_delay(self, category: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(category.to_string(), delay);
        self
    }

    /// Records returned whenever no scripted reply is queued.
    pub fn with_data(self, filters: &FilterSelection, records: Vec<SpendRecord>) -> Self {
        self.data.lock().unwrap().insert(filters.clone(), records);
        self
    }

    /// Replies consumed one per fetch, before falling back to the data map.
    pub fn with_script(self, filters: &FilterSelection, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(filters.clone(), replies.into());
        self
    }

    pub fn calls(&self) -> Vec<FilterSelection> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, filters)| filters.clone())
            .collect()
    }

    /// When each dashboard fetch started.
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl SpendSource for FakeSource {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
        if self.hang_categories {
            return std::future::pending().await;
        }
        if self.fail_combos {
            return ApiSnafu {
                endpoint: "categories",
                status: 500u16,
                message: "boom",
            }
            .fail();
        }
        Ok(self.categories.clone())
    }

    async fn list_month_years(&self, _from: i32, _to: i32) -> Result<Vec<String>, SourceError> {
        if self.fail_combos {
            return ApiSnafu {
                endpoint: "month_years",
                status: 500u16,
                message: "boom",
            }
            .fail();
        }
        Ok(self.month_years.clone())
    }

    async fn fetch_dashboard(
        &self,
        filters: &FilterSelection,
    ) -> Result<Vec<SpendRecord>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), filters.clone()));
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(&filters.category)
            .copied();
        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(filters)
            .and_then(VecDeque::pop_front);
        let fallback = self
            .data
            .lock()
            .unwrap()
            .get(filters)
            .cloned()
            .unwrap_or_default();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(Reply::Records(records)) => Ok(records),
            Some(Reply::Fail(message)) => ApiSnafu {
                endpoint: "dashboard",
                status: 503u16,
                message,
            }
            .fail(),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(fallback),
        }
    }
}

pub fn record(day: u32, week: u32, value: f64, goal: f64, current: bool) -> SpendRecord {
    SpendRecord {
        date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
        month_year: "Janeiro/2026".to_string(),
        week_name: Some(format!("Semana {week}")),
        value_spent: Amount::from(value),
        target_value: Amount::from(goal),
        current_week: current,
    }
}

pub fn settings(filters: &FilterSelection) -> EngineSettings {
    EngineSettings {
        interval: Duration::from_secs(60),
        countdown_tick: Duration::from_secs(1),
        label_reveal_delay: Duration::from_millis(1600),
        from_year: 2025,
        to_year: 2026,
        combo_timeout: Duration::from_secs(10),
        category: Some(filters.category.clone()),
        month_year: Some(filters.month_year.clone()),
        mode: ViewMode::Daily,
    }
}

pub fn as_source(fake: &Arc<FakeSource>) -> Arc<dyn SpendSource> {
    fake.clone()
}

/// Waits (in virtual time) until a published view satisfies `pred`.
pub async fn wait_for(
    rx: &mut watch::Receiver<DashboardView>,
    pred: impl FnMut(&DashboardView) -> bool,
) -> DashboardView {
    tokio::time::timeout(Duration::from_secs(600), rx.wait_for(pred))
        .await
        .expect("timed out waiting for view")
        .expect("engine dropped the view channel")
        .clone()
}
