use super::thresholds::{
    LOAD_FACTOR_DETERIORATION_RATIO, LOAD_FACTOR_GOOD, LOAD_FACTOR_IMPROVEMENT_RATIO,
    LOAD_FACTOR_LOW, LOAD_FACTOR_MIN,
};
use super::{Finding, FindingKind, Severity, Topic, NOT_ENOUGH_HISTORY};
use crate::types::MonthlyRecord;
use crate::util::average;

const RECOMMENDATIONS: [&str; 4] = [
    "Review how the load is distributed throughout the day.",
    "Consider installing an energy storage system.",
    "Evaluate adding loads during low-demand hours.",
    "Check whether some equipment can run during lower-demand hours.",
];

/// Evaluate how well the contracted capacity is used.
pub fn analyze_load_factor(history: &[MonthlyRecord], current_lf: f64) -> Vec<Finding> {
    if history.len() < 2 {
        return vec![Finding::insufficient_data(Topic::LoadFactor, NOT_ENOUGH_HISTORY)];
    }

    let values: Vec<f64> = history.iter().map(|r| r.load_factor_pct).collect();
    let avg = average(&values);
    let months_below = values.iter().filter(|&&lf| lf < LOAD_FACTOR_MIN).count();

    let mut findings = Vec::new();

    if current_lf < LOAD_FACTOR_MIN {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::LoadFactor,
            FindingKind::VeryLowLoadFactor,
            format!(
                "The current value ({current_lf:.1}%) is below the recommended minimum ({LOAD_FACTOR_MIN:.0}%)."
            ),
        ));
        if months_below > 1 {
            findings.push(Finding::new(
                Severity::Alert,
                Topic::LoadFactor,
                FindingKind::RecurringLowLoadFactor,
                format!("This is month {months_below} with a low load factor. Urgent action required!"),
            ));
        }
    } else if current_lf < LOAD_FACTOR_LOW {
        findings.push(Finding::new(
            Severity::Warning,
            Topic::LoadFactor,
            FindingKind::LowLoadFactor,
            format!("The current value ({current_lf:.1}%) is below the optimum."),
        ));
    } else if current_lf > LOAD_FACTOR_GOOD {
        findings.push(Finding::new(
            Severity::Success,
            Topic::LoadFactor,
            FindingKind::GoodLoadFactor,
            format!(
                "The current value ({current_lf:.1}%) shows good use of the installed capacity."
            ),
        ));
    } else {
        findings.push(Finding::new(
            Severity::Info,
            Topic::LoadFactor,
            FindingKind::ModerateLoadFactor,
            format!("The current value ({current_lf:.1}%) is within an acceptable range."),
        ));
    }

    if current_lf < avg * LOAD_FACTOR_DETERIORATION_RATIO {
        findings.push(Finding::new(
            Severity::Alert,
            Topic::LoadFactor,
            FindingKind::Deterioration,
            format!("The load factor has worsened compared with the historical average ({avg:.1}%)."),
        ));
    } else if current_lf > avg * LOAD_FACTOR_IMPROVEMENT_RATIO {
        findings.push(Finding::new(
            Severity::Success,
            Topic::LoadFactor,
            FindingKind::Improvement,
            format!("The load factor has improved compared with the historical average ({avg:.1}%)."),
        ));
    }

    if current_lf < LOAD_FACTOR_LOW {
        findings.push(Finding::recommendations(
            Topic::LoadFactor,
            "Recommendations to improve the load factor",
            &RECOMMENDATIONS,
        ));
    }

    findings
}
