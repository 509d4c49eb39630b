//! Projection of the engine's raw evaluation onto the advantage bar.
//!
//! Evaluations arrive from the engine's own point of view: positive
//! numbers and `M<n>` mates favor the engine, negative numbers and `-M<n>`
//! favor the user. The whole mapping is pure so it can be tested without
//! a terminal anywhere near it.

use crate::board::Color;

/// A raw evaluation together with its display projection.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReading {
    raw: String,
    user_percent: u8,
    label: String,
    leans_user: bool,
}

impl EvalReading {
    /// Parses a raw evaluation string.
    ///
    /// Total over arbitrary input: text that reads as neither a mate nor
    /// a number is treated as an even `0.0`.
    pub fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            user_percent: user_percent(raw),
            label: label(raw),
            leans_user: raw.contains('-'),
        }
    }

    /// The even reading shown before the engine has evaluated anything.
    pub fn neutral() -> Self {
        Self::from_raw("0.0")
    }

    /// The raw evaluation exactly as the engine sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Favorability for the user: 0 (lost) to 100 (won), 50 even.
    pub fn user_percent(&self) -> u8 {
        self.user_percent
    }

    /// Display text: mates keep their distance but lose their sign
    /// (`M3`); scores under 10 pawns keep one decimal, larger ones round
    /// to whole pawns.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when the reading leans toward the user.
    pub fn leans_user(&self) -> bool {
        self.leans_user
    }

    /// The side currently favored, given which color the user plays.
    pub fn favored_color(&self, player: Color) -> Color {
        if self.leans_user {
            player
        } else {
            player.opponent()
        }
    }
}

/// Maps a raw evaluation onto the user's favorability percent.
///
/// Mates collapse to the ends of the bar. Numeric magnitudes land on the
/// user's side of 50 when negative and the engine's side when positive:
/// the first 5 pawns cover the 45 points out to 5/95, and the stretch
/// from 5 to the 20-pawn clamp eases across the last 4 points, so a
/// crushing-but-not-yet-mate score reads as crushing rather than flat.
fn user_percent(raw: &str) -> u8 {
    if raw.starts_with("-M") {
        return 100;
    }
    if raw.starts_with('M') {
        return 0;
    }

    let value: f64 = raw.trim().parse().unwrap_or(0.0);
    let magnitude = value.abs().min(20.0);
    let offset = if magnitude <= 5.0 {
        (45.0 * magnitude / 5.0).round()
    } else {
        (45.0 + (magnitude - 5.0) * 4.0 / 15.0).round()
    };

    let percent = if value > 0.0 {
        50.0 - offset
    } else {
        50.0 + offset
    };
    percent as u8
}

fn label(raw: &str) -> String {
    if raw.contains('M') {
        return raw.replace('-', "");
    }
    let magnitude: f64 = raw.trim().parse::<f64>().unwrap_or(0.0).abs();
    if magnitude < 10.0 {
        format!("{magnitude:.1}")
    } else {
        format!("{}", magnitude.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_score_sits_in_the_middle() {
        assert_eq!(EvalReading::from_raw("0.0").user_percent(), 50);
        assert_eq!(EvalReading::neutral().user_percent(), 50);
    }

    #[test]
    fn sign_picks_the_side_of_the_bar() {
        // Positive favors the engine, pushing the user below 50.
        assert_eq!(EvalReading::from_raw("2.5").user_percent(), 27);
        assert_eq!(EvalReading::from_raw("-2.5").user_percent(), 73);
    }

    #[test]
    fn five_pawns_reaches_the_inner_edge() {
        assert_eq!(EvalReading::from_raw("5.0").user_percent(), 5);
        assert_eq!(EvalReading::from_raw("-5.0").user_percent(), 95);
    }

    #[test]
    fn deep_advantages_keep_growing_to_the_clamp() {
        // 12.5 pawns: 45 + 7.5 * 4/15 = 47.
        assert_eq!(EvalReading::from_raw("-12.5").user_percent(), 97);
        assert_eq!(EvalReading::from_raw("12.5").user_percent(), 3);
        // At and beyond the 20-pawn clamp the offset caps at 49.
        assert_eq!(EvalReading::from_raw("-20").user_percent(), 99);
        assert_eq!(EvalReading::from_raw("25.0").user_percent(), 1);
        assert_eq!(EvalReading::from_raw("-350.0").user_percent(), 99);
        assert_eq!(EvalReading::from_raw("350.0").user_percent(), 1);
    }

    #[test]
    fn deep_band_stays_monotonic_and_under_mate() {
        let mut last = EvalReading::from_raw("-5.0").user_percent();
        for tenths in 51..=250 {
            let raw = format!("-{:.1}", tenths as f64 / 10.0);
            let percent = EvalReading::from_raw(&raw).user_percent();
            assert!(percent >= last, "{raw} regressed");
            assert!(percent < 100, "{raw} reached the mate end");
            last = percent;
        }
    }

    #[test]
    fn mates_collapse_to_the_ends() {
        assert_eq!(EvalReading::from_raw("M1").user_percent(), 0);
        assert_eq!(EvalReading::from_raw("M12").user_percent(), 0);
        assert_eq!(EvalReading::from_raw("-M1").user_percent(), 100);
        assert_eq!(EvalReading::from_raw("-M7").user_percent(), 100);
    }

    #[test]
    fn unparsable_text_reads_as_even() {
        let reading = EvalReading::from_raw("n/a");
        assert_eq!(reading.user_percent(), 50);
        assert_eq!(reading.label(), "0.0");
        assert_eq!(reading.raw(), "n/a");
    }

    #[test]
    fn labels_drop_signs_and_trim_precision() {
        assert_eq!(EvalReading::from_raw("M3").label(), "M3");
        assert_eq!(EvalReading::from_raw("-M3").label(), "M3");
        assert_eq!(EvalReading::from_raw("1.37").label(), "1.4");
        assert_eq!(EvalReading::from_raw("-0.5").label(), "0.5");
        assert_eq!(EvalReading::from_raw("15.21").label(), "15");
        assert_eq!(EvalReading::from_raw("-112.0").label(), "112");
    }

    #[test]
    fn leaning_names_the_favored_side() {
        let ours = EvalReading::from_raw("-1.0");
        assert!(ours.leans_user());
        assert_eq!(ours.favored_color(Color::Black), Color::Black);

        let theirs = EvalReading::from_raw("1.0");
        assert!(!theirs.leans_user());
        assert_eq!(theirs.favored_color(Color::Black), Color::White);

        let mate = EvalReading::from_raw("-M2");
        assert!(mate.leans_user());
        assert_eq!(mate.favored_color(Color::White), Color::White);
    }
}
