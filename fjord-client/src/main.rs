use fjord_client::feedback::wizard::WizardKind;
use fjord_client::LaunchOptions;
use std::path::PathBuf;

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    args.iter()
        .find_map(|a| a.strip_prefix(prefix.as_str()))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let kind = match flag_value(&args, "--form") {
        Some(name) => match WizardKind::parse(name) {
            Some(kind) => kind,
            None => {
                eprintln!("fjord-client: unknown form {:?} (expected fxos|android|generic)", name);
                std::process::exit(2);
            }
        },
        None => WizardKind::default(),
    };
    let opts = LaunchOptions {
        config: flag_value(&args, "--config").map(PathBuf::from),
        kind,
        search: flag_value(&args, "--query").unwrap_or_default().to_string(),
        fragment: flag_value(&args, "--card").unwrap_or_default().to_string(),
    };

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific card and exits 0.
    // Usage: --tui-smoke or --tui-smoke=intro|moreinfo|context|submitting|thanks|failure|tryagain|dashboard
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        fjord_client::run_tui_smoke(&opts, target);
        return;
    }

    // One real POST against the configured endpoint; exits 0 on thanks, 1 on failure.
    if args.iter().any(|a| a == "--submit-smoke") {
        fjord_client::run_submit_smoke(&opts);
        return;
    }

    if let Some(path) = flag_value(&args, "--rule-match") {
        fjord_client::run_rule_match(&opts, &PathBuf::from(path));
        return;
    }

    if let Some(path) = flag_value(&args, "--dashboard") {
        fjord_client::run_dashboard(&opts, &PathBuf::from(path));
        return;
    }

    // Overrides:
    // - CLI flag --tui forces the interactive wizard (the default)
    // - Env var FJORD_CLIENT_UI=tui|smoke
    let force_tui = args.iter().any(|a| a == "--tui");
    let env_pref = std::env::var("FJORD_CLIENT_UI")
        .ok()
        .unwrap_or_else(|| "tui".to_string());
    let env_pref = env_pref.trim().to_ascii_lowercase();

    if !force_tui && env_pref == "smoke" {
        fjord_client::run_tui_smoke(&opts, None);
        return;
    }
    fjord_client::run_tui(&opts);
}
