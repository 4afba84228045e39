mod alarm;
mod time_provider;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::alarm::model::{PopupContent, TargetTime, parse_target_time};
use crate::alarm::settings::{PopupStyle, RingSettings, load_settings};
use crate::alarm::wait::wait_until;
use crate::time_provider::SystemClock;

const USAGE_EXIT_CODE: i32 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPopupStyle {
    Plain,
    Clock,
}

impl From<CliPopupStyle> for PopupStyle {
    fn from(value: CliPopupStyle) -> Self {
        match value {
            CliPopupStyle::Plain => PopupStyle::Plain,
            CliPopupStyle::Clock => PopupStyle::Clock,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "ring",
    version,
    about = "Wait until a time of day, then pop up a reminder window",
    arg_required_else_help = true
)]
struct Cli {
    /// Time to ring at, 24-hour clock
    #[arg(value_name = "H[H][:M[M]]", value_parser = parse_target_time)]
    at: TargetTime,

    /// Message to show; the current time is shown when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    message: Vec<String>,

    /// Seconds between clock checks while waiting
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    poll_secs: Option<u64>,

    /// Seconds between time refreshes in the clock-style popup
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    refresh_secs: Option<u64>,

    #[arg(long, value_enum)]
    style: Option<CliPopupStyle>,

    /// Show the message exactly as typed
    #[arg(long)]
    no_title_case: bool,

    #[arg(long)]
    no_always_on_top: bool,

    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print what would happen and exit without waiting
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayVersion => 0,
                _ => USAGE_EXIT_CODE,
            };
            let _ = err.print();
            if matches!(
                err.kind(),
                ErrorKind::ValueValidation | ErrorKind::InvalidValue
            ) {
                eprintln!("\n{}", Cli::command().render_usage());
            }
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = resolve_settings(&cli)?;
    let content = PopupContent::from_words(&cli.message, settings.popup.title_case);
    log::info!(
        "ringing at {} with {:?}, polling every {}s",
        cli.at,
        content,
        settings.poll_interval.as_secs()
    );

    if cli.dry_run {
        print!("{}", describe_plan(cli.at, &content, &settings));
        return Ok(());
    }

    wait_until(&SystemClock, cli.at, settings.poll_interval, std::thread::sleep);
    ui::popup::run_popup(content, &settings.popup)
}

fn resolve_settings(cli: &Cli) -> Result<RingSettings> {
    let mut settings = match &cli.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => RingSettings::default(),
    };

    if let Some(secs) = cli.poll_secs {
        settings.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.refresh_secs {
        settings.popup.refresh_interval = Duration::from_secs(secs);
    }
    if let Some(style) = cli.style {
        settings.popup.style = style.into();
    }
    if cli.no_title_case {
        settings.popup.title_case = false;
    }
    if cli.no_always_on_top {
        settings.popup.always_on_top = false;
    }
    Ok(settings)
}

fn describe_plan(at: TargetTime, content: &PopupContent, settings: &RingSettings) -> String {
    let message = match content {
        PopupContent::Message(text) => text.clone(),
        PopupContent::Clock => "(current time)".to_string(),
    };
    let style = match settings.popup.style {
        PopupStyle::Plain => "plain".to_string(),
        PopupStyle::Clock if content.is_clock() => format!(
            "clock (refresh every {}s)",
            settings.popup.refresh_interval.as_secs()
        ),
        PopupStyle::Clock => "clock".to_string(),
    };
    let on_top = if settings.popup.always_on_top { "yes" } else { "no" };

    format!(
        "Ring at: {at}\nMessage: {message}\nPoll interval: {}s\nPopup style: {style}\nTitle: {}\nAlways on top: {on_top}\n",
        settings.poll_interval.as_secs(),
        settings.popup.title,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trailing_words_become_the_message() {
        let cli = Cli::try_parse_from(["ring", "14:30", "lunch", "with", "sam"]).expect("valid");
        assert_eq!(cli.at, TargetTime::new(14, 30).expect("valid"));
        assert_eq!(cli.message, vec!["lunch", "with", "sam"]);
    }

    #[test]
    fn message_may_start_with_a_hyphen() {
        let cli = Cli::try_parse_from(["ring", "9", "-5", "degrees"]).expect("valid");
        assert_eq!(cli.at, TargetTime::new(9, 0).expect("valid"));
        assert_eq!(cli.message, vec!["-5", "degrees"]);
        assert_eq!(
            PopupContent::from_words(&cli.message, true),
            PopupContent::Message("-5 Degrees".to_string())
        );
    }

    #[test]
    fn malformed_time_is_a_value_error() {
        for token in ["25:00", "abc", "", "9:"] {
            let err = Cli::try_parse_from(["ring", token]).expect_err("should fail");
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "token {token:?}");
        }
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Cli::try_parse_from(["ring", "--poll-secs", "0", "9"]).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ring",
            "--poll-secs",
            "5",
            "--refresh-secs",
            "7",
            "--style",
            "plain",
            "--no-title-case",
            "--no-always-on-top",
            "9",
        ])
        .expect("valid");
        let settings = resolve_settings(&cli).expect("settings");
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.popup.refresh_interval, Duration::from_secs(7));
        assert_eq!(settings.popup.style, PopupStyle::Plain);
        assert!(!settings.popup.title_case);
        assert!(!settings.popup.always_on_top);
    }

    #[test]
    fn plan_mentions_refresh_only_for_clock_content() {
        let settings = RingSettings::default();
        let at = TargetTime::new(9, 0).expect("valid");

        let clock_plan = describe_plan(at, &PopupContent::Clock, &settings);
        assert!(clock_plan.contains("Ring at: 09:00"));
        assert!(clock_plan.contains("Message: (current time)"));
        assert!(clock_plan.contains("clock (refresh every 20s)"));

        let message = PopupContent::Message("Lunch".to_string());
        let message_plan = describe_plan(at, &message, &settings);
        assert!(message_plan.contains("Message: Lunch"));
        assert!(message_plan.contains("Popup style: clock\n"));
    }
}
