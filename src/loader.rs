use crate::error::LoadError;
use crate::types::{
    Billing, CurrentPeriodMetrics, Demand, Month, MonthlyRecord, RawRow, SiteData, BILLING_COLUMNS,
};
use crate::util::{coerce_f64, Coerced};
use csv::{Reader, ReaderBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// History rows kept after validation.
    pub history_rows: usize,
    /// Rows dropped because they could not be read or had an unknown month.
    pub skipped_rows: usize,
    /// Non-empty cells that were not numbers and were read as zero.
    pub coerced_values: usize,
}

impl LoadReport {
    fn merge(&mut self, other: &LoadReport) {
        self.history_rows += other.history_rows;
        self.skipped_rows += other.skipped_rows;
        self.coerced_values += other.coerced_values;
    }
}

/// File-name form of a site name: spaces, dashes and slashes become `_`.
pub fn site_file_stem(site: &str) -> String {
    site.replace([' ', '-', '/'], "_")
}

pub fn history_path(data_dir: &Path, site: &str) -> PathBuf {
    data_dir.join(format!("historial_{}.csv", site_file_stem(site)))
}

pub fn current_path(data_dir: &Path, site: &str) -> PathBuf {
    data_dir.join(format!("pozo_{}.csv", site_file_stem(site)))
}

/// Counts malformed cells while turning them into zeros.
#[derive(Default)]
struct Coercer {
    invalid: usize,
}

impl Coercer {
    fn num(&mut self, cell: &Option<String>) -> f64 {
        let coerced = coerce_f64(cell.as_deref());
        if coerced == Coerced::Invalid {
            self.invalid += 1;
        }
        coerced.value()
    }

    fn demand(&mut self, row: &RawRow) -> Demand {
        Demand {
            base_kw: self.num(&row.base_demand),
            intermediate_kw: self.num(&row.intermediate_demand),
            peak_kw: self.num(&row.peak_demand),
        }
    }
}

fn open(path: &Path) -> Result<Reader<File>, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }
    ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a site's monthly history and sort it by month.
///
/// Rows with an unrecognised `Mes` are dropped; the sort is stable, so a
/// month that appears twice keeps file order.
pub fn load_history(path: &Path) -> Result<(Vec<MonthlyRecord>, LoadReport), LoadError> {
    let mut rdr = open(path)?;
    let mut coercer = Coercer::default();
    let mut skipped_rows = 0usize;
    let mut records: Vec<MonthlyRecord> = Vec::new();

    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %path.display(), line = line + 2, error = %e, "unreadable history row");
                skipped_rows += 1;
                continue;
            }
        };
        let Some(period) = row.month.as_deref().and_then(Month::from_label) else {
            debug!(path = %path.display(), month = ?row.month, "history row with unknown month");
            skipped_rows += 1;
            continue;
        };

        records.push(MonthlyRecord {
            period,
            total_consumption_kwh: coercer.num(&row.total_consumption),
            base_consumption_kwh: coercer.num(&row.base_consumption),
            intermediate_consumption_kwh: coercer.num(&row.intermediate_consumption),
            peak_consumption_kwh: coercer.num(&row.peak_consumption),
            power_factor_pct: coercer.num(&row.power_factor),
            load_factor_pct: coercer.num(&row.load_factor),
            kwh: coercer.num(&row.kwh),
            kvarh: coercer.num(&row.kvarh),
            demand: coercer.demand(&row),
            contracted_load_kw: coercer.num(&row.contracted_load),
        });
    }

    records.sort_by_key(|r| r.period);

    let report = LoadReport {
        history_rows: records.len(),
        skipped_rows,
        coerced_values: coercer.invalid,
    };
    Ok((records, report))
}

/// Read the current-period file. Only its first data row is used.
pub fn load_current(path: &Path) -> Result<(CurrentPeriodMetrics, LoadReport), LoadError> {
    let mut rdr = open(path)?;
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    for column in BILLING_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            warn!(path = %path.display(), column, "billing column missing, using 0");
        }
    }

    let row: RawRow = match rdr.deserialize().next() {
        Some(Ok(row)) => row,
        Some(Err(source)) => {
            return Err(LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })
        }
        None => return Err(LoadError::EmptyCurrent(path.to_path_buf())),
    };

    let mut coercer = Coercer::default();
    let current = CurrentPeriodMetrics {
        period: row.month.as_deref().and_then(Month::from_label),
        total_consumption_kwh: coercer.num(&row.total_consumption),
        base_consumption_kwh: coercer.num(&row.base_consumption),
        intermediate_consumption_kwh: coercer.num(&row.intermediate_consumption),
        peak_consumption_kwh: coercer.num(&row.peak_consumption),
        power_factor_pct: coercer.num(&row.power_factor),
        load_factor_pct: coercer.num(&row.load_factor),
        demand: coercer.demand(&row),
        billing: Billing {
            subtotal: coercer.num(&row.subtotal),
            tax: coercer.num(&row.tax),
            dap: coercer.num(&row.dap),
            fees_and_deposits: coercer.num(&row.fees_and_deposits),
            credits_and_roundoffs: coercer.num(&row.credits_and_roundoffs),
            total_bill: coercer.num(&row.total_bill),
        },
    };

    let report = LoadReport {
        coerced_values: coercer.invalid,
        ..LoadReport::default()
    };
    Ok((current, report))
}

/// Load both files for `site` from `data_dir`.
pub fn load_site(data_dir: &Path, site: &str) -> Result<(SiteData, LoadReport), LoadError> {
    let (history, mut report) = load_history(&history_path(data_dir, site))?;
    let (current, current_report) = load_current(&current_path(data_dir, site))?;
    report.merge(&current_report);

    info!(
        site,
        months = report.history_rows,
        skipped = report.skipped_rows,
        coerced = report.coerced_values,
        "loaded site data"
    );

    let data = SiteData {
        site: site.to_string(),
        history,
        current,
    };
    Ok((data, report))
}
