use super::thresholds::{
    POWER_FACTOR_DETERIORATION_RATIO, POWER_FACTOR_IMPROVEMENT_RATIO, POWER_FACTOR_LIMIT,
    POWER_FACTOR_TARGET,
};
use super::{Finding, FindingKind, Severity, Topic, NOT_ENOUGH_HISTORY};
use crate::types::MonthlyRecord;
use crate::util::average;

const RECOMMENDATIONS: [&str; 4] = [
    "Install capacitors to correct the power factor.",
    "Review motors and equipment that may be causing low efficiency.",
    "Consider a power quality study.",
    "Check for equipment running idle or at partial load.",
];

/// Evaluate the current power factor against the utility limit and the
/// site's own history.
///
/// Only historical months count towards the "months below limit" figure;
/// the current period is not included.
pub fn analyze_power_factor(history: &[MonthlyRecord], current_pf: f64) -> Vec<Finding> {
    if history.len() < 2 {
        return vec![Finding::insufficient_data(Topic::PowerFactor, NOT_ENOUGH_HISTORY)];
    }

    let values: Vec<f64> = history.iter().map(|r| r.power_factor_pct).collect();
    let avg = average(&values);
    let months_below = values.iter().filter(|&&pf| pf < POWER_FACTOR_LIMIT).count();

    let mut findings = Vec::new();

    if current_pf < POWER_FACTOR_LIMIT {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::PowerFactor,
            FindingKind::LowPowerFactor,
            format!(
                "The current value ({current_pf:.1}%) is below the recommended limit ({POWER_FACTOR_LIMIT:.0}%)."
            ),
        ));
        if months_below > 1 {
            findings.push(Finding::new(
                Severity::Alert,
                Topic::PowerFactor,
                FindingKind::RecurringLowPowerFactor,
                format!("This is month {months_below} with a low power factor. Urgent action required!"),
            ));
        } else {
            findings.push(Finding::new(
                Severity::Alert,
                Topic::PowerFactor,
                FindingKind::FirstLowPowerFactor,
                "First month with a low power factor. Immediate attention recommended.",
            ));
        }
    } else if current_pf < POWER_FACTOR_TARGET {
        findings.push(Finding::new(
            Severity::Warning,
            Topic::PowerFactor,
            FindingKind::BorderlinePowerFactor,
            format!(
                "The current value ({current_pf:.1}%) is close to the recommended limit ({POWER_FACTOR_LIMIT:.0}%)."
            ),
        ));
    } else {
        findings.push(Finding::new(
            Severity::Success,
            Topic::PowerFactor,
            FindingKind::GoodPowerFactor,
            format!("The current value ({current_pf:.1}%) is above the recommended limit."),
        ));
    }

    if current_pf < avg * POWER_FACTOR_DETERIORATION_RATIO {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::PowerFactor,
            FindingKind::Deterioration,
            format!("The power factor has worsened compared with the historical average ({avg:.1}%)."),
        ));
    } else if current_pf > avg * POWER_FACTOR_IMPROVEMENT_RATIO {
        findings.push(Finding::new(
            Severity::Success,
            Topic::PowerFactor,
            FindingKind::Improvement,
            format!("The power factor has improved compared with the historical average ({avg:.1}%)."),
        ));
    }

    if current_pf < POWER_FACTOR_LIMIT {
        findings.push(Finding::recommendations(
            Topic::PowerFactor,
            "Recommendations to improve the power factor",
            &RECOMMENDATIONS,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::history;

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn short_history_is_insufficient() {
        let findings = analyze_power_factor(&history(&[(1000.0, 85.0, 50.0)]), 80.0);
        assert_eq!(kinds(&findings), vec![FindingKind::InsufficientData]);
        assert_eq!(findings[0].topic, Topic::PowerFactor);
    }

    #[test]
    fn first_low_month_with_deterioration() {
        let h = history(&[(1000.0, 96.0, 50.0), (1000.0, 94.0, 50.0)]);
        let findings = analyze_power_factor(&h, 80.0);
        assert_eq!(
            kinds(&findings),
            vec![
                FindingKind::LowPowerFactor,
                FindingKind::FirstLowPowerFactor,
                FindingKind::Deterioration,
                FindingKind::Recommendations,
            ]
        );
        assert!(findings[..3].iter().all(|f| f.severity == Severity::Alert));
        assert!(findings[0].message.contains("80.0%"));
        assert!(findings[2].message.contains("95.0%"));
        assert_eq!(findings[3].recommendations.len(), 4);
    }

    #[test]
    fn recurring_low_months_are_urgent() {
        let h = history(&[(1000.0, 85.0, 50.0), (1000.0, 88.0, 50.0), (1000.0, 92.0, 50.0)]);
        let findings = analyze_power_factor(&h, 87.0);
        assert_eq!(findings[1].kind, FindingKind::RecurringLowPowerFactor);
        assert!(findings[1].message.contains("month 2"));
    }

    #[test]
    fn single_low_month_in_history_is_still_first() {
        let h = history(&[(1000.0, 85.0, 50.0), (1000.0, 92.0, 50.0)]);
        let findings = analyze_power_factor(&h, 87.0);
        assert_eq!(findings[1].kind, FindingKind::FirstLowPowerFactor);
    }

    #[test]
    fn borderline_without_recommendations() {
        let h = history(&[(1000.0, 92.0, 50.0), (1000.0, 92.0, 50.0)]);
        let findings = analyze_power_factor(&h, 92.0);
        assert_eq!(kinds(&findings), vec![FindingKind::BorderlinePowerFactor]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn limit_value_is_borderline_not_low() {
        let h = history(&[(1000.0, 90.0, 50.0), (1000.0, 90.0, 50.0)]);
        let findings = analyze_power_factor(&h, 90.0);
        assert_eq!(findings[0].kind, FindingKind::BorderlinePowerFactor);
    }

    #[test]
    fn good_power_factor_with_improvement() {
        let h = history(&[(1000.0, 91.0, 50.0), (1000.0, 93.0, 50.0)]);
        let findings = analyze_power_factor(&h, 98.0);
        assert_eq!(
            kinds(&findings),
            vec![FindingKind::GoodPowerFactor, FindingKind::Improvement]
        );
        assert_eq!(findings[1].severity, Severity::Success);
    }
}
