use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use spend_dashboard::{
    DashboardEngine, DashboardView, ViewMode,
    combo::load_combo_options,
    config::{DashboardConfig, load_config_path},
    countdown::{format_clock, format_countdown},
    filters::initial_selection,
    labels::LabelVisibility,
    scheduler::{FetchCompletion, RefreshScheduler},
};
use spend_source::source::{SpendSource, http::HttpSpendSource};
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: f64 = 30.0;

#[derive(Parser)]
#[command(version, about = "Spend dashboard CLI")]
struct Cli {
    /// TOML config; defaults apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print the category and month/year options.
    Options,
    /// Fetch once and print the dashboard view as JSON.
    Snapshot(FilterArgs),
    /// Keep refreshing and render the dashboard until Ctrl-C.
    Watch(FilterArgs),
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    month_year: Option<String>,
    #[arg(long)]
    mode: Option<ViewMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spend_dashboard=info,spend_source=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => {
            let cfg = DashboardConfig::default();
            cfg.validate()?;
            cfg
        }
    };
    let source: Arc<dyn SpendSource> = Arc::new(
        HttpSpendSource::new(cfg.base_url()).context("building finance API client")?,
    );

    match cli.cmd {
        Cmd::Options => {
            let settings = cfg.engine_settings();
            let options = load_combo_options(
                &*source,
                settings.from_year,
                settings.to_year,
                settings.combo_timeout,
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Cmd::Snapshot(args) => snapshot(source, &cfg, args).await?,
        Cmd::Watch(args) => watch(source, &cfg, args).await?,
    }

    Ok(())
}

async fn snapshot(
    source: Arc<dyn SpendSource>,
    cfg: &DashboardConfig,
    args: FilterArgs,
) -> Result<()> {
    let mut settings = cfg.engine_settings();
    apply_args(&mut settings, args);

    let options = load_combo_options(
        &*source,
        settings.from_year,
        settings.to_year,
        settings.combo_timeout,
    )
    .await;
    let filters = initial_selection(
        settings.category.as_deref(),
        settings.month_year.as_deref(),
        &options,
    );

    let mut scheduler = RefreshScheduler::new(filters, settings.interval);
    let ticket = scheduler
        .issue(Utc::now())
        .context("scheduler refused to issue a fetch")?;
    let records = source
        .fetch_dashboard(&ticket.filters)
        .await
        .with_context(|| format!("fetching dashboard for {}", ticket.filters))?;
    scheduler.apply(
        FetchCompletion {
            ticket,
            result: Ok(records),
        },
        Utc::now(),
    );

    let view = DashboardView::derive(&scheduler, settings.mode, LabelVisibility::Visible);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn watch(
    source: Arc<dyn SpendSource>,
    cfg: &DashboardConfig,
    args: FilterArgs,
) -> Result<()> {
    let mut settings = cfg.engine_settings();
    apply_args(&mut settings, args);

    let handle = DashboardEngine::start(source, settings).await;
    let mut views = handle.subscribe();
    let mut last_rendered: Option<DashboardView> = None;

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if last_rendered.as_ref().is_some_and(|prev| same_content(prev, &view)) {
                    print!("\rnext refresh in {}", format_countdown(view.refresh.remaining_ms));
                    std::io::stdout().flush()?;
                } else {
                    println!();
                    print!("{}", render(&view));
                    last_rendered = Some(view);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!();
    handle.stop();
    handle.join().await?;
    Ok(())
}

fn apply_args(settings: &mut spend_dashboard::EngineSettings, args: FilterArgs) {
    if args.category.is_some() {
        settings.category = args.category;
    }
    if args.month_year.is_some() {
        settings.month_year = args.month_year;
    }
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
}

/// Equal apart from the countdown.
fn same_content(a: &DashboardView, b: &DashboardView) -> bool {
    a.filters == b.filters
        && a.mode == b.mode
        && a.status == b.status
        && a.series == b.series
        && a.labels == b.labels
        && a.last_error == b.last_error
        && a.refresh.last_fetch_at == b.refresh.last_fetch_at
        && a.running == b.running
}

fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "== {} [{}] status: {:?}\n",
        view.filters, view.mode, view.status
    ));
    out.push_str(&format!(
        "last update {} | next {} ({})\n",
        format_clock(view.refresh.last_fetch_at),
        format_clock(view.refresh.next_fetch_at),
        format_countdown(view.refresh.remaining_ms),
    ));
    if let Some(err) = &view.last_error {
        out.push_str(&format!(
            "! fetch failed {}x: {err}\n",
            view.consecutive_failures
        ));
    }

    let k = &view.kpis;
    out.push_str(&format!(
        "total {:.2} | average {:.2} | projection {:.2} | goal {:.2}\n",
        k.total, k.average, k.projection, k.goal_total
    ));
    match view.goal_ratio {
        Some(ratio) => out.push_str(&format!(
            "goal left {:.2} ({:.0}% spent)\n",
            view.goal_gap,
            ratio * 100.0
        )),
        None => out.push_str("no goal set\n"),
    }

    if view.has_no_data() {
        out.push_str("(no data for this selection)\n");
        return out;
    }

    let max = view
        .series
        .values()
        .flatten()
        .map(|p| p.value.max(p.goal))
        .fold(0.0_f64, f64::max);
    for (month, points) in &view.series {
        out.push_str(&format!("{month}\n"));
        for p in points {
            let width = if max > 0.0 {
                (p.value / max * BAR_WIDTH).round() as usize
            } else {
                0
            };
            let marker = if p.is_current_period { '*' } else { ' ' };
            out.push_str(&format!("{marker}{:>9} {}", p.label, "#".repeat(width)));
            if view.labels_visible() {
                out.push_str(&format!(" {:.2} / {:.2}", p.value, p.goal));
            }
            out.push('\n');
        }
    }
    out
}
