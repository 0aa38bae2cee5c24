use crate::analysis::{analyze_site, time_of_use_shares, SiteFindings, TimeOfUseShares};
use crate::types::{
    Billing, CostRow, DistributionRow, HistoryRow, Month, MonthlyRecord, SiteData, TouShareRow,
};
use crate::util::{format_number, pct_change};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Current month against the month before it in the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousComparison {
    pub month: Month,
    /// Percent change; absent when the previous month had no consumption.
    pub consumption_change_pct: Option<f64>,
    pub power_factor_change_pts: f64,
    pub load_factor_change_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSummary {
    pub consumption_kwh: f64,
    pub power_factor_pct: f64,
    pub load_factor_pct: f64,
    pub previous: Option<PreviousComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Economics {
    pub billing: Billing,
    /// Sum of the line items; shown as the total cost.
    pub total_cost: f64,
    pub cost_per_kwh: Option<f64>,
}

impl Economics {
    pub fn cost_rows(&self) -> Vec<CostRow> {
        let b = &self.billing;
        [
            ("Subtotal", b.subtotal),
            ("VAT 8%", b.tax),
            ("DAP", b.dap),
            ("Fees and deposits", b.fees_and_deposits),
            ("Credits and roundoffs", b.credits_and_roundoffs),
            ("Total cost", self.total_cost),
            ("Invoice total (stated)", b.total_bill),
        ]
        .into_iter()
        .map(|(concept, amount)| CostRow {
            concept: concept.to_string(),
            amount: format!("${}", format_number(amount, 2)),
        })
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub site: String,
    pub generated_at: DateTime<Local>,
    pub current_period: Option<Month>,
    pub summary: CurrentSummary,
    pub consumption_distribution: Vec<DistributionRow>,
    pub demand_distribution: Vec<DistributionRow>,
    pub total_demand_kw: f64,
    pub history: Vec<HistoryRow>,
    pub time_of_use_by_month: Vec<TouShareRow>,
    pub economics: Economics,
    pub findings: SiteFindings,
}

pub fn build_site_report(data: &SiteData) -> SiteReport {
    let current = &data.current;
    let consumption = current.consumption_sum();

    SiteReport {
        site: data.site.clone(),
        generated_at: Local::now(),
        current_period: current.period,
        summary: summarize_current(data),
        consumption_distribution: distribution_rows(
            [
                current.base_consumption_kwh,
                current.intermediate_consumption_kwh,
                current.peak_consumption_kwh,
            ],
            "kWh",
        ),
        demand_distribution: distribution_rows(
            [
                current.demand.base_kw,
                current.demand.intermediate_kw,
                current.demand.peak_kw,
            ],
            "kW",
        ),
        total_demand_kw: current.demand.total(),
        history: history_rows(&data.history),
        time_of_use_by_month: time_of_use_by_month(&data.history),
        economics: economics(&current.billing, consumption),
        findings: analyze_site(&data.history, current),
    }
}

/// Summary cards. The comparison month is the second-to-last history entry,
/// since the last one is usually the current month itself.
pub fn summarize_current(data: &SiteData) -> CurrentSummary {
    let current = &data.current;
    let consumption_kwh = current.consumption_sum();

    let previous = match data.history.as_slice() {
        [.., prev, _] => Some(PreviousComparison {
            month: prev.period,
            consumption_change_pct: if prev.total_consumption_kwh > 0.0 {
                pct_change(prev.total_consumption_kwh, consumption_kwh)
            } else {
                None
            },
            power_factor_change_pts: current.power_factor_pct - prev.power_factor_pct,
            load_factor_change_pts: current.load_factor_pct - prev.load_factor_pct,
        }),
        _ => None,
    };

    CurrentSummary {
        consumption_kwh,
        power_factor_pct: current.power_factor_pct,
        load_factor_pct: current.load_factor_pct,
        previous,
    }
}

fn distribution_rows(values: [f64; 3], unit: &str) -> Vec<DistributionRow> {
    let [base, intermediate, peak] = values;
    let shares = time_of_use_shares(base, intermediate, peak).unwrap_or(TimeOfUseShares {
        base_pct: 0.0,
        intermediate_pct: 0.0,
        peak_pct: 0.0,
    });
    [
        ("Base", base, shares.base_pct),
        ("Intermediate", intermediate, shares.intermediate_pct),
        ("Peak", peak, shares.peak_pct),
    ]
    .into_iter()
    .map(|(bucket, value, pct)| DistributionRow {
        bucket: bucket.to_string(),
        value: format!("{} {}", format_number(value, 0), unit),
        share_pct: format_number(pct, 1),
    })
    .collect()
}

pub fn history_rows(history: &[MonthlyRecord]) -> Vec<HistoryRow> {
    history
        .iter()
        .map(|r| HistoryRow {
            month: r.period.to_string(),
            total_kwh: format_number(r.total_consumption_kwh, 0),
            base_kwh: format_number(r.base_consumption_kwh, 0),
            intermediate_kwh: format_number(r.intermediate_consumption_kwh, 0),
            peak_kwh: format_number(r.peak_consumption_kwh, 0),
            power_factor: format_number(r.power_factor_pct, 2),
            load_factor: format_number(r.load_factor_pct, 2),
        })
        .collect()
}

/// Per-month share of each tariff period, relative to the stated monthly
/// total. Months with no consumption are left out.
pub fn time_of_use_by_month(history: &[MonthlyRecord]) -> Vec<TouShareRow> {
    history
        .iter()
        .filter(|r| r.total_consumption_kwh > 0.0)
        .map(|r| {
            let total = r.total_consumption_kwh;
            TouShareRow {
                month: r.period.to_string(),
                base_pct: format_number(r.base_consumption_kwh / total * 100.0, 1),
                intermediate_pct: format_number(r.intermediate_consumption_kwh / total * 100.0, 1),
                peak_pct: format_number(r.peak_consumption_kwh / total * 100.0, 1),
            }
        })
        .collect()
}

pub fn economics(billing: &Billing, consumption_kwh: f64) -> Economics {
    let total_cost = billing.computed_total();
    let cost_per_kwh = (consumption_kwh > 0.0).then(|| total_cost / consumption_kwh);
    Economics {
        billing: *billing,
        total_cost,
        cost_per_kwh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FindingKind;
    use crate::types::{CurrentPeriodMetrics, Demand};

    fn record(period: Month, base: f64, inter: f64, peak: f64, pf: f64, lf: f64) -> MonthlyRecord {
        let mut r = MonthlyRecord::new(period, base + inter + peak, pf, lf);
        r.base_consumption_kwh = base;
        r.intermediate_consumption_kwh = inter;
        r.peak_consumption_kwh = peak;
        r
    }

    fn site() -> SiteData {
        SiteData {
            site: "5-R_CH".to_string(),
            history: vec![
                record(Month::January, 500.0, 300.0, 200.0, 95.0, 50.0),
                record(Month::February, 400.0, 400.0, 200.0, 94.0, 48.0),
                record(Month::March, 600.0, 300.0, 300.0, 93.0, 45.0),
            ],
            current: CurrentPeriodMetrics {
                period: Some(Month::March),
                total_consumption_kwh: 1200.0,
                base_consumption_kwh: 600.0,
                intermediate_consumption_kwh: 300.0,
                peak_consumption_kwh: 300.0,
                power_factor_pct: 93.0,
                load_factor_pct: 45.0,
                demand: Demand {
                    base_kw: 50.0,
                    intermediate_kw: 30.0,
                    peak_kw: 20.0,
                },
                billing: Billing {
                    subtotal: 2000.0,
                    tax: 160.0,
                    dap: 40.0,
                    fees_and_deposits: 0.0,
                    credits_and_roundoffs: 0.0,
                    total_bill: 2200.0,
                },
            },
        }
    }

    #[test]
    fn summary_compares_with_second_to_last_month() {
        let summary = summarize_current(&site());
        assert_eq!(summary.consumption_kwh, 1200.0);
        let prev = summary.previous.unwrap();
        assert_eq!(prev.month, Month::February);
        assert!((prev.consumption_change_pct.unwrap() - 20.0).abs() < 1e-9);
        assert!((prev.power_factor_change_pts + 1.0).abs() < 1e-9);
        assert!((prev.load_factor_change_pts + 3.0).abs() < 1e-9);
    }

    #[test]
    fn summary_without_enough_history_has_no_comparison() {
        let mut data = site();
        data.history.truncate(1);
        assert!(summarize_current(&data).previous.is_none());
    }

    #[test]
    fn zero_previous_consumption_skips_percent_change() {
        let mut data = site();
        data.history[1] = record(Month::February, 0.0, 0.0, 0.0, 94.0, 48.0);
        let prev = summarize_current(&data).previous.unwrap();
        assert_eq!(prev.consumption_change_pct, None);
    }

    #[test]
    fn distributions_carry_shares() {
        let report = build_site_report(&site());
        let shares: Vec<&str> = report
            .consumption_distribution
            .iter()
            .map(|r| r.share_pct.as_str())
            .collect();
        assert_eq!(shares, vec!["50.0", "25.0", "25.0"]);
        assert_eq!(report.demand_distribution[0].value, "50 kW");
        assert_eq!(report.demand_distribution[0].share_pct, "50.0");
        assert_eq!(report.total_demand_kw, 100.0);
    }

    #[test]
    fn empty_distribution_is_all_zero() {
        let rows = distribution_rows([0.0, 0.0, 0.0], "kW");
        assert!(rows.iter().all(|r| r.share_pct == "0.0"));
    }

    #[test]
    fn monthly_shares_skip_empty_months() {
        let history = vec![
            record(Month::January, 500.0, 300.0, 200.0, 95.0, 50.0),
            record(Month::February, 0.0, 0.0, 0.0, 95.0, 50.0),
        ];
        let rows = time_of_use_by_month(&history);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, "January");
        assert_eq!(rows[0].base_pct, "50.0");
        assert_eq!(rows[0].peak_pct, "20.0");
    }

    #[test]
    fn economics_uses_line_item_total() {
        let econ = economics(&site().current.billing, 1200.0);
        assert!((econ.total_cost - 2200.0).abs() < 1e-9);
        assert!((econ.cost_per_kwh.unwrap() - 2200.0 / 1200.0).abs() < 1e-12);
        assert_eq!(economics(&Billing::default(), 0.0).cost_per_kwh, None);

        let rows = econ.cost_rows();
        assert_eq!(rows[0].amount, "$2,000.00");
        assert_eq!(rows.last().map(|r| r.amount.as_str()), Some("$2,200.00"));
    }

    #[test]
    fn report_includes_all_finding_groups() {
        let report = build_site_report(&site());
        assert!(!report.findings.consumption.is_empty());
        assert!(!report.findings.distribution.is_empty());
        assert!(!report.findings.power_factor.is_empty());
        assert!(!report.findings.load_factor.is_empty());
        assert_eq!(report.findings.trend[0].kind, FindingKind::ConsumptionIncrease);
        assert_eq!(report.history.len(), 3);
        assert_eq!(report.history[2].total_kwh, "1,200");
    }

    #[test]
    fn report_serializes_to_json() {
        let report = build_site_report(&site());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["site"], "5-R_CH");
        assert_eq!(json["current_period"], "March");
        assert!(json["findings"]["trend"].is_array());
    }
}
