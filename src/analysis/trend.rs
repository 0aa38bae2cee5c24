use super::thresholds::{TREND_CONSUMPTION_PCT, TREND_FACTOR_POINTS};
use super::{Finding, FindingKind, Severity, Topic, NOT_ENOUGH_HISTORY};
use crate::types::{Month, MonthlyRecord};
use crate::util::pct_change;

/// Compare the last month of history with the first one for consumption,
/// power factor and load factor.
///
/// Consumption is compared in percent (0 when the first month is zero);
/// the two factors in percentage points.
pub fn analyze_trend(history: &[MonthlyRecord]) -> Vec<Finding> {
    let (first, last) = match history {
        [first, .., last] if history.len() >= 3 => (first, last),
        _ => return vec![Finding::insufficient_data(Topic::Trend, NOT_ENOUGH_HISTORY)],
    };
    let anchor = first.period;

    let consumption_change =
        pct_change(first.total_consumption_kwh, last.total_consumption_kwh).unwrap_or(0.0);
    let pf_change = last.power_factor_pct - first.power_factor_pct;
    let lf_change = last.load_factor_pct - first.load_factor_pct;

    let mut findings = Vec::with_capacity(5);

    findings.push(if consumption_change > TREND_CONSUMPTION_PCT {
        Finding::new(
            Severity::Alert,
            Topic::Trend,
            FindingKind::ConsumptionIncrease,
            format!("Significant increase of {consumption_change:.1}% since {anchor}."),
        )
    } else if consumption_change < -TREND_CONSUMPTION_PCT {
        Finding::new(
            Severity::Success,
            Topic::Trend,
            FindingKind::ConsumptionDecrease,
            format!(
                "Significant decrease of {:.1}% since {anchor}.",
                consumption_change.abs()
            ),
        )
    } else {
        Finding::new(
            Severity::Info,
            Topic::Trend,
            FindingKind::ConsumptionStable,
            format!("Stable, with a change of {consumption_change:.1}% since {anchor}."),
        )
    });

    findings.push(factor_trend(
        "power factor",
        pf_change,
        anchor,
        [
            FindingKind::PowerFactorDeterioration,
            FindingKind::PowerFactorImprovement,
            FindingKind::PowerFactorStable,
        ],
    ));
    findings.push(factor_trend(
        "load factor",
        lf_change,
        anchor,
        [
            FindingKind::LoadFactorDeterioration,
            FindingKind::LoadFactorImprovement,
            FindingKind::LoadFactorStable,
        ],
    ));

    let rising = consumption_change > TREND_CONSUMPTION_PCT;
    if rising && pf_change < 0.0 {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::Trend,
            FindingKind::RisingConsumptionWithPowerFactorDrop,
            "Rising consumption with a deteriorating power factor. Urgent review recommended.",
        ));
    }
    if rising && lf_change < 0.0 {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::Trend,
            FindingKind::RisingConsumptionWithLoadFactorDrop,
            "Rising consumption with a deteriorating load factor. Urgent review recommended.",
        ));
    }

    findings
}

/// `kinds` is `[deterioration, improvement, stable]`.
fn factor_trend(label: &str, change: f64, anchor: Month, kinds: [FindingKind; 3]) -> Finding {
    let [worse, better, stable] = kinds;
    if change < -TREND_FACTOR_POINTS {
        Finding::new(
            Severity::Alert,
            Topic::Trend,
            worse,
            format!(
                "The {label} deteriorated by {:.1} points since {anchor}.",
                change.abs()
            ),
        )
    } else if change > TREND_FACTOR_POINTS {
        Finding::new(
            Severity::Success,
            Topic::Trend,
            better,
            format!("The {label} improved by {change:.1} points since {anchor}."),
        )
    } else {
        Finding::new(
            Severity::Info,
            Topic::Trend,
            stable,
            format!("The {label} is stable, with a change of {change:.1} points since {anchor}."),
        )
    }
}
