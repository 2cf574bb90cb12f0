// Fjord feedback client
//
// Library: card wizard, validators, query-string codec, submission flow, chart models and the
// trigger-rule tester. Binary: terminal front end plus non-interactive smoke modes.

pub mod api;
pub mod cards;
pub mod charts;
pub mod feedback;
pub mod models;
pub mod tui;
pub mod ui;
pub mod utils;

use api::triggerrule::TriggerRuleForm;
use cards::history::MemoryHistory;
use cards::CardId;
use charts::DashboardData;
use feedback::cache::MemoryCache;
use feedback::wizard::WizardKind;
use feedback::FeedbackForm;
use log::{error, info, warn};
use models::settings::Settings;
use models::state::AppContext;
use std::path::{Path, PathBuf};

/// Command-line options shared by every run mode.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub config: Option<PathBuf>,
    pub kind: WizardKind,
    /// Page query string, e.g. `?utm_source=hello&prompted`.
    pub search: String,
    /// Starting fragment, e.g. `moreinfo`.
    pub fragment: String,
}

fn init_logging(with_stdout: bool, log_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = utils::path_resolver::resolve_log_folder(log_dir)?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("fjord-client-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("fjord-client-{}.txt", timestamp));

    // Optional stdout chain; disabled for the TUI so the terminal isn't corrupted.
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Logging first: a configured `log_dir` is peeked at, but a broken config is only reported
/// once logging is up.
fn start(opts: &LaunchOptions, with_stdout: bool, mode: &str) {
    let log_dir = Settings::load(opts.config.as_deref())
        .ok()
        .and_then(|s| s.log_dir);
    if let Err(e) = init_logging(with_stdout, log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(
        "[PHASE: initialization] fjord-client {} ({}) starting at {}",
        env!("CARGO_PKG_VERSION"),
        mode,
        chrono::Utc::now()
    );
}

fn load_context(opts: &LaunchOptions) -> anyhow::Result<AppContext> {
    let settings = Settings::load(opts.config.as_deref())?;
    info!(
        "[PHASE: initialization] [STEP: config] base_url={} product={} locale={}",
        settings.base_url, settings.product, settings.locale
    );
    AppContext::new(settings)
}

fn fail(phase: &str, e: &anyhow::Error) -> ! {
    error!("[PHASE: {}] [STEP: fatal] {:?}", phase, e);
    eprintln!("fjord-client error: {:#}", e);
    std::process::exit(1);
}

fn block_on<F: std::future::Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(fut))
}

/// Interactive feedback wizard.
pub fn run_tui(opts: &LaunchOptions) {
    start(opts, false, "tui");

    let ctx = match load_context(opts) {
        Ok(ctx) => ctx,
        Err(e) => fail("initialization", &e),
    };
    if let Err(e) = tui::run(&ctx, opts.kind, &opts.search, &opts.fragment) {
        fail("tui", &e);
    }
}

/// Non-interactive TUI smoke mode (for automated checks).
/// Renders a single frame to an in-memory backend and exits.
pub fn run_tui_smoke(opts: &LaunchOptions, target: Option<String>) {
    start(opts, false, "tui-smoke");

    let target = target.as_deref().unwrap_or("intro");
    if let Err(e) = tui::smoke(target) {
        fail("tui", &e);
    }
}

pub fn run_dashboard(opts: &LaunchOptions, path: &Path) {
    start(opts, false, "dashboard");

    let data = match DashboardData::load(path) {
        Ok(data) => data,
        Err(e) => fail("dashboard", &e),
    };
    if let Err(e) = tui::dashboard::run(data) {
        fail("tui", &e);
    }
}

/// One scripted submission against the configured endpoint. Exits 0 on thanks, 1 otherwise.
///
/// Uses an in-memory cache so a failed smoke run never leaves a pending submission behind.
pub fn run_submit_smoke(opts: &LaunchOptions) {
    start(opts, true, "submit-smoke");

    let ctx = match load_context(opts) {
        Ok(ctx) => ctx,
        Err(e) => fail("initialization", &e),
    };
    let mut form = match FeedbackForm::new(
        opts.kind,
        ctx.settings(),
        Box::new(MemoryCache::new()),
        &opts.search,
        MemoryHistory::default(),
    ) {
        Ok(form) => form,
        Err(e) => fail("feedback", &anyhow::Error::from(e)),
    };

    if let Err(e) = script_submission(&mut form) {
        fail("feedback", &anyhow::Error::from(e));
    }

    let transport = ctx.feedback_transport();
    let card = match block_on(form.submit(transport.as_ref())) {
        Ok(Ok(card)) => card,
        Ok(Err(e)) => fail("feedback", &anyhow::Error::from(e)),
        Err(e) => fail("feedback", &e),
    };

    println!("Submission ended on card: {}", card);
    if card == CardId::Thanks {
        info!("[PHASE: feedback] [STEP: smoke] Submit smoke passed");
    } else {
        warn!(
            "[PHASE: feedback] [STEP: smoke] Submit smoke ended on {}",
            card
        );
        std::process::exit(1);
    }
}

fn script_submission(form: &mut FeedbackForm) -> Result<(), cards::NavError> {
    form.select_happy_sad(true)?;
    form.set_description("fjord-client submit smoke");
    form.next()?;
    if form.kind().asks_for_device() {
        form.set_country("Smoke");
        form.set_device("Smoke");
    }
    Ok(())
}

/// Post a draft trigger rule from a TOML file and print the matches.
pub fn run_rule_match(opts: &LaunchOptions, path: &Path) {
    start(opts, true, "rule-match");

    let ctx = match load_context(opts) {
        Ok(ctx) => ctx,
        Err(e) => fail("initialization", &e),
    };
    let form = match TriggerRuleForm::from_toml_file(path) {
        Ok(form) => form,
        Err(e) => fail("triggerrule", &e),
    };

    let transport = ctx.rule_transport();
    let mut panel = api::triggerrule::MatchPanel::default();
    if let Err(e) = block_on(panel.run(&form, transport.as_ref())) {
        fail("triggerrule", &e);
    }
    for line in panel.lines() {
        println!("{}", line);
    }
    if panel.error.is_some() {
        std::process::exit(1);
    }
}
