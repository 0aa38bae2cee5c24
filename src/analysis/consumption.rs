use super::thresholds::{HIGH_CONSUMPTION_RATIO, LOW_CONSUMPTION_RATIO, MONTHLY_TREND_PCT};
use super::{Finding, FindingKind, Severity, Topic, NOT_ENOUGH_HISTORY};
use crate::types::MonthlyRecord;
use crate::util::{average, format_number, pct_change};

const RECOMMENDATIONS: [&str; 3] = [
    "Review operating schedules to find possible inefficiencies.",
    "Check the condition of equipment (pumps, motors) that may be drawing more energy.",
    "Consider preventive maintenance to optimize consumption.",
];

/// Compare the current consumption with the site's history.
///
/// Months whose previous value is zero are left out of the average
/// month-over-month change.
pub fn analyze_consumption(history: &[MonthlyRecord], current_total: f64) -> Vec<Finding> {
    if history.len() < 2 {
        return vec![Finding::insufficient_data(Topic::Consumption, NOT_ENOUGH_HISTORY)];
    }

    let totals: Vec<f64> = history.iter().map(|r| r.total_consumption_kwh).collect();
    let avg = average(&totals);
    let changes: Vec<f64> = totals
        .windows(2)
        .filter_map(|w| pct_change(w[0], w[1]))
        .collect();
    let avg_variation = average(&changes);

    let mut findings = Vec::new();
    let current = format_number(current_total, 0);
    let average_kwh = format_number(avg, 0);

    let high = current_total > avg * HIGH_CONSUMPTION_RATIO;
    if high {
        let message = match pct_change(avg, current_total) {
            Some(pct) => format!(
                "Current consumption ({current} kWh) is {pct:.1}% above the historical average ({average_kwh} kWh)."
            ),
            None => format!(
                "Current consumption ({current} kWh) is above the historical average ({average_kwh} kWh)."
            ),
        };
        findings.push(Finding::new(
            Severity::Alert,
            Topic::Consumption,
            FindingKind::HighConsumption,
            message,
        ));
    } else if current_total < avg * LOW_CONSUMPTION_RATIO {
        // avg is necessarily positive here.
        let pct = (1.0 - current_total / avg) * 100.0;
        findings.push(Finding::new(
            Severity::Success,
            Topic::Consumption,
            FindingKind::GoodPerformance,
            format!(
                "Current consumption ({current} kWh) is {pct:.1}% below the historical average ({average_kwh} kWh)."
            ),
        ));
    } else {
        findings.push(Finding::new(
            Severity::Info,
            Topic::Consumption,
            FindingKind::StableConsumption,
            format!(
                "Current consumption ({current} kWh) is close to the historical average ({average_kwh} kWh)."
            ),
        ));
    }

    let trend = if avg_variation > MONTHLY_TREND_PCT {
        Finding::new(
            Severity::Alert,
            Topic::Consumption,
            FindingKind::UpwardTrend,
            format!(
                "Consumption has been rising in recent months (average monthly change {avg_variation:+.1}%)."
            ),
        )
    } else if avg_variation < -MONTHLY_TREND_PCT {
        Finding::new(
            Severity::Success,
            Topic::Consumption,
            FindingKind::DownwardTrend,
            format!(
                "Consumption has been falling in recent months (average monthly change {avg_variation:+.1}%)."
            ),
        )
    } else {
        Finding::new(
            Severity::Info,
            Topic::Consumption,
            FindingKind::StableTrend,
            "Consumption has kept a stable trend.",
        )
    };
    findings.push(trend);

    if high {
        findings.push(Finding::recommendations(
            Topic::Consumption,
            "Ways to bring consumption back to normal",
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
        for rows in [&[][..], &[(1000.0, 95.0, 50.0)][..]] {
            let findings = analyze_consumption(&history(rows), 1000.0);
            assert_eq!(findings.len(), 1);
            assert_eq!(findings[0].severity, Severity::Info);
            assert_eq!(findings[0].kind, FindingKind::InsufficientData);
        }
    }

    #[test]
    fn flat_history_is_stable_without_recommendations() {
        let h = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 1000.0);
        assert_eq!(
            kinds(&findings),
            vec![FindingKind::StableConsumption, FindingKind::StableTrend]
        );
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
        assert!(findings.iter().all(|f| f.recommendations.is_empty()));
    }

    #[test]
    fn high_consumption_adds_recommendations() {
        let h = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 1200.0);
        assert_eq!(
            kinds(&findings),
            vec![
                FindingKind::HighConsumption,
                FindingKind::StableTrend,
                FindingKind::Recommendations
            ]
        );
        assert_eq!(findings[0].severity, Severity::Alert);
        assert!(findings[0].message.contains("20.0% above"));
        assert!(findings[0].message.contains("1,200 kWh"));
        assert_eq!(findings[2].recommendations.len(), 3);
    }

    #[test]
    fn boundary_of_ten_percent_is_stable() {
        let h = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        assert_eq!(analyze_consumption(&h, 1100.0)[0].kind, FindingKind::StableConsumption);
        assert_eq!(analyze_consumption(&h, 900.0)[0].kind, FindingKind::StableConsumption);
    }

    #[test]
    fn low_consumption_is_good_performance() {
        let h = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 750.0);
        assert_eq!(findings[0].kind, FindingKind::GoodPerformance);
        assert_eq!(findings[0].severity, Severity::Success);
        assert!(findings[0].message.contains("25.0% below"));
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn rising_history_is_upward_trend() {
        // +10% then +10%: mean change 10%.
        let h = history(&[(1000.0, 95.0, 50.0), (1100.0, 95.0, 50.0), (1210.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 1100.0);
        assert_eq!(findings[1].kind, FindingKind::UpwardTrend);
        assert_eq!(findings[1].severity, Severity::Alert);
    }

    #[test]
    fn falling_history_is_downward_trend() {
        let h = history(&[(1000.0, 95.0, 50.0), (800.0, 95.0, 50.0), (640.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 800.0);
        assert_eq!(findings[1].kind, FindingKind::DownwardTrend);
        assert_eq!(findings[1].severity, Severity::Success);
    }

    #[test]
    fn zero_prior_month_is_left_out_of_the_trend() {
        // 0 -> 1000 is undefined and skipped; 1000 -> 1000 is 0%.
        let h = history(&[(0.0, 95.0, 50.0), (1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 700.0);
        assert_eq!(findings[1].kind, FindingKind::StableTrend);
        assert!(findings.iter().all(|f| !f.message.contains("NaN")));
    }

    #[test]
    fn zero_average_omits_the_percentage() {
        let h = history(&[(0.0, 95.0, 50.0), (0.0, 95.0, 50.0)]);
        let findings = analyze_consumption(&h, 10.0);
        assert_eq!(findings[0].kind, FindingKind::HighConsumption);
        assert!(!findings[0].message.contains('%'));
        assert!(!findings[0].message.contains("inf"));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let h = history(&[(1000.0, 95.0, 50.0), (1300.0, 95.0, 50.0), (900.0, 95.0, 50.0)]);
        assert_eq!(analyze_consumption(&h, 1500.0), analyze_consumption(&h, 1500.0));
    }
}
