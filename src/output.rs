use crate::analysis::{Finding, Severity};
use crate::error::OutputError;
use crate::loader::site_file_stem;
use crate::reports::SiteReport;
use crate::util::format_number;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let csv_err = |source: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, s).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "INFO",
        Severity::Warning => "WARNING",
        Severity::Alert => "ALERT",
        Severity::Success => "OK",
    }
}

/// Plain-text rendering: one line per finding, recommendations as bullets.
pub fn render_findings(findings: &[Finding]) -> String {
    let mut out = String::new();
    for f in findings {
        let _ = writeln!(
            out,
            "[{}] {}: {}",
            severity_label(f.severity),
            f.title(),
            f.message
        );
        for item in &f.recommendations {
            let _ = writeln!(out, "    - {}", item);
        }
    }
    out
}

fn print_section(title: &str, findings: &[Finding]) {
    println!("{}", title);
    if findings.is_empty() {
        println!("(nothing to report)\n");
        return;
    }
    println!("{}", render_findings(findings));
}

pub fn print_site_report(report: &SiteReport, preview_rows: usize) {
    let summary = &report.summary;
    let period = report
        .current_period
        .map(|m| m.to_string())
        .unwrap_or_else(|| "current period".to_string());

    println!("Current Month Summary - {} ({})\n", report.site, period);
    println!("Total consumption: {} kWh", format_number(summary.consumption_kwh, 0));
    println!("Power factor:      {}%", format_number(summary.power_factor_pct, 2));
    println!("Load factor:       {}%", format_number(summary.load_factor_pct, 2));
    if let Some(prev) = &summary.previous {
        let consumption = prev
            .consumption_change_pct
            .map(|pct| format!("{:+.1}%", pct))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "vs {}: consumption {}, power factor {:+.2} pts, load factor {:+.2} pts",
            prev.month, consumption, prev.power_factor_change_pts, prev.load_factor_change_pts
        );
    }
    println!();

    print_section("Consumption Analysis", &report.findings.consumption);

    println!("Consumption Distribution - {}\n", report.site);
    preview_table_rows(&report.consumption_distribution, 3);
    print_section("Distribution Analysis", &report.findings.distribution);

    println!("Demand Distribution - {}\n", report.site);
    preview_table_rows(&report.demand_distribution, 3);
    println!("Total demand: {} kW\n", format_number(report.total_demand_kw, 0));

    print_section("Power Factor Analysis", &report.findings.power_factor);
    print_section("Load Factor Analysis", &report.findings.load_factor);

    println!("Historical Analysis - {}\n", report.site);
    if report.history.len() > 1 {
        preview_table_rows(&report.history, preview_rows);
        print_section("Trend Analysis", &report.findings.trend);
        println!("Consumption Share by Tariff Period (History)\n");
        preview_table_rows(&report.time_of_use_by_month, preview_rows);
    } else {
        println!("Not enough historical data to show the analysis.\n");
    }

    println!("Economic Information - {}\n", report.site);
    preview_table_rows(&report.economics.cost_rows(), 7);
    if let Some(cost) = report.economics.cost_per_kwh {
        println!("Cost per kWh: ${:.4}\n", cost);
    }
}

/// Write the JSON report and the two history tables into `out_dir`.
pub fn export_site_report(report: &SiteReport, out_dir: &Path) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(out_dir).map_err(|source| OutputError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let stem = site_file_stem(&report.site);

    let json_path = out_dir.join(format!("{}_report.json", stem));
    write_json(&json_path, report)?;
    let history_path = out_dir.join(format!("{}_history.csv", stem));
    write_csv(&history_path, &report.history)?;
    let tou_path = out_dir.join(format!("{}_tou_by_month.csv", stem));
    write_csv(&tou_path, &report.time_of_use_by_month)?;

    Ok(vec![json_path, history_path, tou_path])
}
