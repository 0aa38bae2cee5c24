//! Rule-based diagnostics over a site's energy records.
//!
//! Every function here is pure: it reads the history and the current-period
//! figures and returns an ordered list of [`Finding`]s. Presentation (labels,
//! colours, markup) is left to the caller.

mod consumption;
mod distribution;
mod load_factor;
mod power_factor;
pub mod thresholds;
mod trend;

pub use consumption::analyze_consumption;
pub use distribution::{analyze_distribution, time_of_use_shares, TimeOfUseShares};
pub use load_factor::analyze_load_factor;
pub use power_factor::analyze_power_factor;
pub use trend::analyze_trend;

use serde::Serialize;

use crate::types::{CurrentPeriodMetrics, MonthlyRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Alert,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Consumption,
    PowerFactor,
    LoadFactor,
    Distribution,
    Trend,
}

/// Which rule produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    InsufficientData,
    Recommendations,

    HighConsumption,
    GoodPerformance,
    StableConsumption,
    UpwardTrend,
    DownwardTrend,
    StableTrend,

    LowPowerFactor,
    FirstLowPowerFactor,
    RecurringLowPowerFactor,
    BorderlinePowerFactor,
    GoodPowerFactor,

    VeryLowLoadFactor,
    RecurringLowLoadFactor,
    LowLoadFactor,
    GoodLoadFactor,
    ModerateLoadFactor,

    /// Current value against the historical average.
    Deterioration,
    Improvement,

    Distribution,
    HighPeakConsumption,
    LowBaseConsumption,

    ConsumptionIncrease,
    ConsumptionDecrease,
    ConsumptionStable,
    PowerFactorDeterioration,
    PowerFactorImprovement,
    PowerFactorStable,
    LoadFactorDeterioration,
    LoadFactorImprovement,
    LoadFactorStable,
    RisingConsumptionWithPowerFactorDrop,
    RisingConsumptionWithLoadFactorDrop,
}

impl FindingKind {
    pub fn title(self) -> &'static str {
        use FindingKind::*;
        match self {
            InsufficientData => "INSUFFICIENT DATA",
            Recommendations => "RECOMMENDATIONS",
            HighConsumption => "HIGH CONSUMPTION",
            GoodPerformance => "GOOD PERFORMANCE",
            StableConsumption => "STABLE CONSUMPTION",
            UpwardTrend => "UPWARD TREND",
            DownwardTrend => "DOWNWARD TREND",
            StableTrend => "STABLE TREND",
            LowPowerFactor => "LOW POWER FACTOR",
            FirstLowPowerFactor | RecurringLowPowerFactor => "LOW POWER FACTOR HISTORY",
            BorderlinePowerFactor => "BORDERLINE POWER FACTOR",
            GoodPowerFactor => "GOOD POWER FACTOR",
            VeryLowLoadFactor => "VERY LOW LOAD FACTOR",
            RecurringLowLoadFactor => "LOW LOAD FACTOR HISTORY",
            LowLoadFactor => "LOW LOAD FACTOR",
            GoodLoadFactor => "GOOD LOAD FACTOR",
            ModerateLoadFactor => "MODERATE LOAD FACTOR",
            Deterioration => "DETERIORATION",
            Improvement => "IMPROVEMENT",
            Distribution => "CONSUMPTION DISTRIBUTION",
            HighPeakConsumption => "HIGH PEAK-HOUR CONSUMPTION",
            LowBaseConsumption => "LOW BASE-HOUR CONSUMPTION",
            ConsumptionIncrease | ConsumptionDecrease | ConsumptionStable => "CONSUMPTION TREND",
            PowerFactorDeterioration | PowerFactorImprovement | PowerFactorStable => {
                "POWER FACTOR TREND"
            }
            LoadFactorDeterioration | LoadFactorImprovement | LoadFactorStable => {
                "LOAD FACTOR TREND"
            }
            RisingConsumptionWithPowerFactorDrop | RisingConsumptionWithLoadFactorDrop => "ALERT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub topic: Topic,
    pub kind: FindingKind,
    pub message: String,
    pub recommendations: Vec<String>,
}

impl Finding {
    pub fn new(severity: Severity, topic: Topic, kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            topic,
            kind,
            message: message.into(),
            recommendations: Vec::new(),
        }
    }

    pub fn insufficient_data(topic: Topic, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, topic, FindingKind::InsufficientData, message)
    }

    pub fn recommendations(topic: Topic, heading: impl Into<String>, items: &[&str]) -> Self {
        Self {
            severity: Severity::Info,
            topic,
            kind: FindingKind::Recommendations,
            message: heading.into(),
            recommendations: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

pub(crate) const NOT_ENOUGH_HISTORY: &str =
    "Not enough historical data to analyze trends.";

/// All findings for one site, grouped the way the report lays them out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteFindings {
    pub consumption: Vec<Finding>,
    pub distribution: Vec<Finding>,
    pub power_factor: Vec<Finding>,
    pub load_factor: Vec<Finding>,
    /// Empty when the history has a single month or none.
    pub trend: Vec<Finding>,
}

impl SiteFindings {
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.consumption
            .iter()
            .chain(&self.distribution)
            .chain(&self.power_factor)
            .chain(&self.load_factor)
            .chain(&self.trend)
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.iter().filter(|f| f.severity == severity).count()
    }
}

/// Run every rule family for a site.
///
/// The engine sees the sum of the three time-of-use buckets as the current
/// consumption, not the stated total column.
pub fn analyze_site(history: &[MonthlyRecord], current: &CurrentPeriodMetrics) -> SiteFindings {
    let trend = if history.len() > 1 {
        analyze_trend(history)
    } else {
        Vec::new()
    };
    SiteFindings {
        consumption: analyze_consumption(history, current.consumption_sum()),
        distribution: analyze_distribution(
            current.base_consumption_kwh,
            current.intermediate_consumption_kwh,
            current.peak_consumption_kwh,
        ),
        power_factor: analyze_power_factor(history, current.power_factor_pct),
        load_factor: analyze_load_factor(history, current.load_factor_pct),
        trend,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::history;
    use super::*;

    fn current(base: f64, inter: f64, peak: f64, pf: f64, lf: f64) -> CurrentPeriodMetrics {
        CurrentPeriodMetrics {
            base_consumption_kwh: base,
            intermediate_consumption_kwh: inter,
            peak_consumption_kwh: peak,
            power_factor_pct: pf,
            load_factor_pct: lf,
            ..Default::default()
        }
    }

    #[test]
    fn site_analysis_uses_bucket_sum_as_current_consumption() {
        let history = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let mut metrics = current(400.0, 300.0, 300.0, 96.0, 50.0);
        // A stale total column must not change the outcome.
        metrics.total_consumption_kwh = 5000.0;

        let findings = analyze_site(&history, &metrics);
        assert_eq!(findings.consumption[0].kind, FindingKind::StableConsumption);
    }

    #[test]
    fn trend_is_skipped_for_single_month_history() {
        let history = history(&[(1000.0, 95.0, 50.0)]);
        let findings = analyze_site(&history, &current(400.0, 300.0, 300.0, 96.0, 50.0));
        assert!(findings.trend.is_empty());
        assert_eq!(findings.consumption.len(), 1);
        assert_eq!(findings.consumption[0].kind, FindingKind::InsufficientData);
    }

    #[test]
    fn trend_guard_applies_for_two_months() {
        let history = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0)]);
        let findings = analyze_site(&history, &current(400.0, 300.0, 300.0, 96.0, 50.0));
        assert_eq!(findings.trend.len(), 1);
        assert_eq!(findings.trend[0].kind, FindingKind::InsufficientData);
    }

    #[test]
    fn severity_counts_cover_every_group() {
        let history = history(&[(1000.0, 95.0, 50.0), (1000.0, 95.0, 50.0), (1500.0, 80.0, 50.0)]);
        let findings = analyze_site(&history, &current(100.0, 100.0, 800.0, 80.0, 15.0));
        let total: usize = [Severity::Info, Severity::Warning, Severity::Alert, Severity::Success]
            .into_iter()
            .map(|s| findings.count_by_severity(s))
            .sum();
        assert_eq!(total, findings.iter().count());
        assert!(findings.count_by_severity(Severity::Alert) > 0);
    }

    #[test]
    fn findings_serialize_with_lowercase_codes() {
        let finding = Finding::new(
            Severity::Alert,
            Topic::PowerFactor,
            FindingKind::LowPowerFactor,
            "low",
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "alert");
        assert_eq!(json["topic"], "power_factor");
        assert_eq!(json["kind"], "low_power_factor");
    }
}
