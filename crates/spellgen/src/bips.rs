//! Percent / basis-point arithmetic and oracle price display math.
//!
//! All float casts and arithmetic for the crate live here so that call-sites
//! in the flows can be lint-clean.

#![expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_arithmetic,
    reason = "dedicated float-math module; casts and arithmetic are intentional"
)]

use crate::prompt::Prompter;
use serde::ser::SerializeStruct as _;
use serde::Serialize;

/// A percentage captured from the operator together with its derived
/// basis-point value.
///
/// Both representations are kept: `bips` is what goes on chain, `percent` is
/// echoed back in generated code comments so reviewers read the number the
/// operator typed; whole percents serialize bare (`75`, not `75.0`).
/// `bips = round(percent * 100)`, ties away from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BipsPercent {
    pub bips: u32,
    pub percent: f64,
}

impl Serialize for BipsPercent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("BipsPercent", 2)?;
        s.serialize_field("bips", &self.bips)?;
        if self.percent.fract().abs() < f64::EPSILON {
            s.serialize_field("percent", &(self.percent as u64))?;
        } else {
            s.serialize_field("percent", &self.percent)?;
        }
        s.end()
    }
}

impl BipsPercent {
    /// Derive from a percentage already validated to lie in `[0, 100]`.
    pub fn from_percent(percent: f64) -> eyre::Result<Self> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            eyre::bail!("percentage out of range [0...100]: {percent}");
        }
        let bips = (percent * 100.0).round() as u32;
        Ok(Self { bips, percent })
    }
}

/// Accept a percentage answer only when it parses and lies in `[0, 100]`.
fn percent_in_range(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && (0.0..=100.0).contains(&v) => Ok(v),
        Ok(v) => Err(format!("{v} is outside [0...100]")),
        Err(_) => Err(format!("{raw} is not a number")),
    }
}

/// Prompt for one economic parameter as a percentage, re-asking until the
/// answer validates, then derive the basis points.
pub fn input_bips_as_percent(
    prompter: &mut dyn Prompter,
    label: &str,
) -> eyre::Result<BipsPercent> {
    let answer = prompter.input_validated(&format!("{label} [0...100]"), &|s| {
        percent_in_range(s).map(|_| ())
    })?;
    let percent = percent_in_range(&answer).map_err(|reason| eyre::eyre!("{reason}"))?;
    BipsPercent::from_percent(percent)
}

/// Human display value for an oracle answer: `answer / 10^decimals`.
pub fn display_price(answer: i128, decimals: u8) -> f64 {
    let divisor = 10_f64.powi(i32::from(decimals));
    answer as f64 / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn percent_to_bips_rounds_half_up() -> eyre::Result<()> {
        // 12.345 * 100 is exactly 1234.5 in f64, the canonical tie case.
        assert_eq!(BipsPercent::from_percent(12.345)?.bips, 1235);
        assert_eq!(BipsPercent::from_percent(0.125)?.bips, 13);
        assert_eq!(BipsPercent::from_percent(0.0)?.bips, 0);
        assert_eq!(BipsPercent::from_percent(0.5)?.bips, 50);
        assert_eq!(BipsPercent::from_percent(2.0)?.bips, 200);
        assert_eq!(BipsPercent::from_percent(75.0)?.bips, 7500);
        assert_eq!(BipsPercent::from_percent(100.0)?.bips, 10_000);
        Ok(())
    }

    #[test]
    fn whole_percentages_never_exceed_ten_thousand_bips() -> eyre::Result<()> {
        for p in 0..=100_u32 {
            let bp = BipsPercent::from_percent(f64::from(p))?;
            assert_eq!(bp.bips, p * 100);
        }
        Ok(())
    }

    #[test]
    fn out_of_range_percentages_are_rejected() {
        assert!(BipsPercent::from_percent(-0.01).is_err());
        assert!(BipsPercent::from_percent(100.5).is_err());
        assert!(BipsPercent::from_percent(f64::NAN).is_err());
        assert!(BipsPercent::from_percent(f64::INFINITY).is_err());
    }

    #[test]
    fn prompt_rejects_invalid_answers_before_acceptance() -> eyre::Result<()> {
        let mut prompter = ScriptedPrompter::new(["150", "abc", "12.345"]);
        let bp = input_bips_as_percent(&mut prompter, "LTV")?;
        assert_eq!(bp.bips, 1235);
        assert_close(bp.percent, 12.345);
        Ok(())
    }

    #[test]
    fn display_price_scales_by_oracle_decimals() {
        assert_close(display_price(205_000_000_000, 8), 2050.0);
        assert_close(display_price(100_000_000, 8), 1.0);
        assert_close(display_price(0, 8), 0.0);
        assert_close(display_price(-5_000_000, 6), -5.0);
    }

    #[test]
    fn whole_percents_serialise_without_a_decimal_point() -> eyre::Result<()> {
        let whole = serde_json::to_value(BipsPercent::from_percent(75.0)?)?;
        assert_eq!(whole, serde_json::json!({ "bips": 7500, "percent": 75 }));

        let fractional = serde_json::to_value(BipsPercent::from_percent(0.5)?)?;
        assert_eq!(fractional, serde_json::json!({ "bips": 50, "percent": 0.5 }));
        Ok(())
    }
}
