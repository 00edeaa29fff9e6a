//! Colorful console output for planning runs.
//!
//! Provides a custom `tracing` layer that formats solver events with colors.
//!
//! ## Log Levels
//!
//! The solver's log level selects the default filter:
//!
//! - **0**: warnings only (failed demands)
//! - **1**: run and demand progress
//! - **2**: every ask and reply
//! - **3**: internal state of the solving rules
//!
//! `RUST_LOG` overrides the default when set.

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static SOLVE_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes the console output for a solver log level.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init(log_level: u8) {
    INIT.get_or_init(|| {
        if log_level > 0 {
            print_banner();
        }

        let filter = EnvFilter::builder()
            .with_default_directive(default_directive(log_level))
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PlanConsoleLayer)
            .try_init();
    });
}

/// Filter level for the solver crate at a log level.
pub fn level_filter(log_level: u8) -> LevelFilter {
    match log_level {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn default_directive(log_level: u8) -> Directive {
    let level = level_filter(log_level);
    format!("planforge_solver={level}")
        .parse()
        .unwrap_or_else(|_| level.into())
}

fn mark_solve_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    SOLVE_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = SOLVE_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 ____  _             _____
|  _ \| | __ _ _ __ |  ___|__  _ __ __ _  ___
| |_) | |/ _` | '_ \| |_ / _ \| '__/ _` |/ _ \
|  __/| | (_| | | | |  _| (_) | | | (_| |  __/
|_|   |_|\__,_|_| |_|_|  \___/|_|  \__, |\___|
                                   |___/
"#;

    let version_line = format!("              v{} - Heuristic Supply Planner\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats solver events with colors.
pub struct PlanConsoleLayer;

impl<S: Subscriber> Layer<S> for PlanConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("planforge") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

/// Fields of one solver event.
#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    demand: Option<String>,
    error: Option<String>,
    date: Option<String>,
    cluster: Option<u64>,
    demands: Option<u64>,
    clusters: Option<u64>,
    threads: Option<u64>,
    planned: Option<f64>,
    short: Option<u64>,
    failed: Option<u64>,
    asks: Option<u64>,
    depth: Option<u64>,
    duration_ms: Option<u64>,
    quantity: Option<f64>,
    cost: Option<f64>,
    penalty: Option<f64>,
    /// Everything else, in recording order.
    other: Vec<(&'static str, String)>,
}

impl EventVisitor {
    fn record_text(&mut self, field: &Field, value: String) {
        match field.name() {
            "event" => self.event = Some(value),
            "demand" => self.demand = Some(value),
            "error" => self.error = Some(value),
            "date" => self.date = Some(value),
            name => self.other.push((name, value)),
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.record_text(field, s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "cluster" => self.cluster = Some(value),
            "demands" => self.demands = Some(value),
            "clusters" => self.clusters = Some(value),
            "threads" => self.threads = Some(value),
            "short" => self.short = Some(value),
            "failed" => self.failed = Some(value),
            "asks" => self.asks = Some(value),
            "depth" => self.depth = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "planned" => self.planned = Some(value as f64),
            name => self.other.push((name, value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value.max(0) as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "planned" => self.planned = Some(value),
            "quantity" => self.quantity = Some(value),
            "cost" => self.cost = Some(value),
            "penalty" => self.penalty = Some(value),
            name => self.other.push((name, format_quantity(value))),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.other.push((field.name(), value.to_string()));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "solve_start" => format_solve_start(v),
        "solve_end" => format_solve_end(v),
        "demand_planned" => format_demand_planned(v),
        "demand_failed" => format_demand_failed(v),
        "ask" | "reply" => format_ask(v, event),
        "" => String::new(),
        _ if level >= Level::DEBUG => format_detail(v, event, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_solve_start(v: &EventVisitor) -> String {
    mark_solve_start();
    format!(
        "{} {} Planning │ {} demands │ {} clusters │ {} threads",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.demands.unwrap_or(0).bright_yellow(),
        v.clusters.unwrap_or(0).bright_yellow(),
        v.threads.unwrap_or(1).bright_yellow(),
    )
}

fn format_solve_end(v: &EventVisitor) -> String {
    let planned = v.planned.unwrap_or(0.0) as u64;
    let short = v.short.unwrap_or(0);
    let failed = v.failed.unwrap_or(0);

    let status = if failed > 0 {
        "FAILURES".bright_red().bold().to_string()
    } else if short > 0 {
        "SHORT".yellow().bold().to_string()
    } else {
        "COMPLETE".bright_green().bold().to_string()
    };

    format!(
        "{} {} Planning done │ {} │ {} planned │ {} short │ {} failed │ {} asks │ cost {} │ penalty {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        planned.bright_green(),
        short.yellow(),
        failed.bright_red(),
        v.asks.unwrap_or(0).white(),
        format_quantity(v.cost.unwrap_or(0.0)).bright_magenta(),
        format_quantity(v.penalty.unwrap_or(0.0)).bright_magenta(),
        status,
    )
}

fn format_demand_planned(v: &EventVisitor) -> String {
    let demand = v.demand.as_deref().unwrap_or("?");
    let quantity = v.quantity.unwrap_or(0.0);
    let planned = v.planned.unwrap_or(0.0);
    let amount = format!("{}/{}", format_quantity(planned), format_quantity(quantity));
    let amount = if planned + 1e-6 >= quantity {
        amount.bright_green().to_string()
    } else {
        amount.yellow().to_string()
    };

    format!(
        "{} {} {} │ cluster {} │ {}",
        format_elapsed(),
        "✓".bright_green(),
        demand.white().bold(),
        v.cluster.unwrap_or(0),
        amount,
    )
}

fn format_demand_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} {} │ cluster {} │ {}",
        format_elapsed(),
        "✗".bright_red(),
        v.demand.as_deref().unwrap_or("?").white().bold(),
        v.cluster.unwrap_or(0),
        v.error.as_deref().unwrap_or("unknown error").bright_red(),
    )
}

fn format_ask(v: &EventVisitor, event: &str) -> String {
    let depth = v.depth.unwrap_or(0) as usize;
    let arrow = if event == "ask" {
        "→".bright_blue().to_string()
    } else {
        "←".bright_cyan().to_string()
    };
    format!(
        "{} {}{} {} @ {}",
        format_elapsed(),
        "  ".repeat(depth.min(40)),
        arrow,
        format_quantity(v.quantity.unwrap_or(0.0)).white(),
        v.date.as_deref().unwrap_or("?").bright_black(),
    )
}

fn format_detail(v: &EventVisitor, event: &str, level: Level) -> String {
    let mut output = format!("{} {}", format_elapsed(), event.bright_black());
    if let Some(demand) = &v.demand {
        output.push_str(&format!(" demand={}", demand));
    }
    for (name, value) in &v.other {
        output.push_str(&format!(" {}={}", name, value));
    }
    if level == Level::TRACE {
        output.bright_black().to_string()
    } else {
        output
    }
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Quantities print without a fraction when they are whole.
fn format_quantity(value: f64) -> String {
    if value.fract().abs() < 1e-9 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_per_log_level() {
        assert_eq!(level_filter(0), LevelFilter::WARN);
        assert_eq!(level_filter(1), LevelFilter::INFO);
        assert_eq!(level_filter(2), LevelFilter::DEBUG);
        assert_eq!(level_filter(3), LevelFilter::TRACE);
        assert_eq!(level_filter(7), LevelFilter::TRACE);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(175.0), "175");
        assert_eq!(format_quantity(0.5), "0.500");
        assert_eq!(format_quantity(-6.0), "-6");
    }

    #[test]
    fn test_unknown_info_event_is_silent() {
        let visitor = EventVisitor {
            event: Some("relocate".into()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::INFO).is_empty());
        assert!(format_event(&visitor, Level::DEBUG).contains("relocate"));
    }

    #[test]
    fn test_failed_demand_shows_error() {
        let visitor = EventVisitor {
            event: Some("demand_failed".into()),
            demand: Some("order-3".into()),
            error: Some("hook failed: blocked".into()),
            cluster: Some(2),
            ..EventVisitor::default()
        };
        let line = format_event(&visitor, Level::WARN);
        assert!(line.contains("order-3"));
        assert!(line.contains("hook failed: blocked"));
    }
}
