//! Command-line interface: the game form.
//!
//! Arguments carry the same validation the session relies on, so a
//! session never starts from settings the program would have to reject
//! later.

use crate::session::ColorChoice;
use clap::Parser;
use std::time::Duration;

/// Play chess in the terminal against a remote rules engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "kingside")]
#[command(about = "Terminal chess against a remote rules engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the rules engine service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub engine_url: String,

    /// Starting position as a FEN string; standard start if omitted
    #[arg(long)]
    pub position: Option<String>,

    /// Side to play
    #[arg(long, value_enum, default_value_t = ColorChoice::Random)]
    pub color: ColorChoice,

    /// Engine thinking time per move, in seconds (fractions allowed)
    #[arg(long, default_value = "3", value_parser = parse_think_seconds)]
    pub think_time: Duration,
}

/// Parses a strictly positive, finite seconds value.
fn parse_think_seconds(raw: &str) -> Result<Duration, String> {
    let seconds: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of seconds"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("thinking time must be a positive number of seconds".to_string());
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_and_fractional_seconds() {
        assert_eq!(parse_think_seconds("3").unwrap(), Duration::from_secs(3));
        assert_eq!(
            parse_think_seconds("0.5").unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn rejects_nonsense_thinking_times() {
        for bad in ["soon", "-1", "0", "inf", "nan"] {
            assert!(parse_think_seconds(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn parses_a_full_command_line() {
        let cli = Cli::try_parse_from([
            "kingside",
            "--engine-url",
            "http://localhost:9000",
            "--color",
            "black",
            "--think-time",
            "1.5",
        ])
        .unwrap();
        assert_eq!(cli.engine_url, "http://localhost:9000");
        assert_eq!(cli.color, ColorChoice::Black);
        assert_eq!(cli.think_time, Duration::from_millis(1500));
        assert_eq!(cli.position, None);
    }

    #[test]
    fn defaults_cover_every_field() {
        let cli = Cli::try_parse_from(["kingside"]).unwrap();
        assert_eq!(cli.engine_url, "http://127.0.0.1:8000");
        assert_eq!(cli.color, ColorChoice::Random);
        assert_eq!(cli.think_time, Duration::from_secs(3));
    }

    #[test]
    fn rejects_a_bad_color() {
        assert!(Cli::try_parse_from(["kingside", "--color", "green"]).is_err());
    }
}
