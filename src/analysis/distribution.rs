use serde::Serialize;

use super::thresholds::{BASE_SHARE_MIN_PCT, PEAK_SHARE_MAX_PCT};
use super::{Finding, FindingKind, Severity, Topic};
use crate::util::{format_number, share_pct};

const PEAK_RECOMMENDATIONS: [&str; 3] = [
    "Check whether some equipment can run during lower-demand hours.",
    "Consider an energy storage system to reduce peak-hour consumption.",
    "Evaluate changing the tariff or the supply contract.",
];

const BASE_RECOMMENDATIONS: [&str; 2] = [
    "Try to move loads to base hours whenever possible.",
    "Look for opportunities to run equipment during lower-cost hours.",
];

/// Percentage of consumption (or demand) falling in each tariff period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeOfUseShares {
    pub base_pct: f64,
    pub intermediate_pct: f64,
    pub peak_pct: f64,
}

/// `None` when the three buckets add up to zero.
pub fn time_of_use_shares(base: f64, intermediate: f64, peak: f64) -> Option<TimeOfUseShares> {
    let total = base + intermediate + peak;
    if total == 0.0 {
        return None;
    }
    Some(TimeOfUseShares {
        base_pct: share_pct(base, total),
        intermediate_pct: share_pct(intermediate, total),
        peak_pct: share_pct(peak, total),
    })
}

/// Break the current consumption down by tariff period and flag an
/// unfavourable split. The peak and base checks are independent.
pub fn analyze_distribution(base: f64, intermediate: f64, peak: f64) -> Vec<Finding> {
    let Some(shares) = time_of_use_shares(base, intermediate, peak) else {
        return vec![Finding::insufficient_data(
            Topic::Distribution,
            "Not enough data to analyze the consumption distribution.",
        )];
    };

    let mut findings = vec![Finding::new(
        Severity::Info,
        Topic::Distribution,
        FindingKind::Distribution,
        format!(
            "Base: {:.1}% ({} kWh); Intermediate: {:.1}% ({} kWh); Peak: {:.1}% ({} kWh).",
            shares.base_pct,
            format_number(base, 0),
            shares.intermediate_pct,
            format_number(intermediate, 0),
            shares.peak_pct,
            format_number(peak, 0),
        ),
    )];

    if shares.peak_pct > PEAK_SHARE_MAX_PCT {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::Distribution,
            FindingKind::HighPeakConsumption,
            format!("More than {PEAK_SHARE_MAX_PCT:.0}% of consumption occurs during peak hours."),
        ));
        findings.push(Finding::recommendations(
            Topic::Distribution,
            "Ways to move load out of peak hours",
            &PEAK_RECOMMENDATIONS,
        ));
    }

    if shares.base_pct < BASE_SHARE_MIN_PCT {
        findings.push(Finding::new(
            Severity::Warning,
            Topic::Distribution,
            FindingKind::LowBaseConsumption,
            format!("Less than {BASE_SHARE_MIN_PCT:.0}% of consumption occurs during base hours."),
        ));
        findings.push(Finding::recommendations(
            Topic::Distribution,
            "Ways to use more of the base hours",
            &BASE_RECOMMENDATIONS,
        ));
    }

    findings
}
