use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Billing month. The data files only ever cover January through August,
/// and the variant order is the order history is sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
}

impl Month {
    pub const ALL: [Month; 8] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
    ];

    /// Parse the `Mes` column. Accepts the Spanish labels written by the
    /// extraction step as well as English names, ignoring case.
    pub fn from_label(label: &str) -> Option<Month> {
        let label = label.trim().to_lowercase();
        let month = match label.as_str() {
            "enero" | "january" => Month::January,
            "febrero" | "february" => Month::February,
            "marzo" | "march" => Month::March,
            "abril" | "april" => Month::April,
            "mayo" | "may" => Month::May,
            "junio" | "june" => Month::June,
            "julio" | "july" => Month::July,
            "agosto" | "august" => Month::August,
            _ => return None,
        };
        Some(month)
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of either per-site CSV file, exactly as read.
///
/// Every field is optional: the history file has no billing columns, and
/// older extractions omit some of the demand columns.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Mes", default)]
    pub month: Option<String>,
    #[serde(rename = "KWH", default)]
    pub kwh: Option<String>,
    #[serde(rename = "KVARH", default)]
    pub kvarh: Option<String>,
    #[serde(rename = "Consumo base", default)]
    pub base_consumption: Option<String>,
    #[serde(rename = "Consumo inter", default)]
    pub intermediate_consumption: Option<String>,
    #[serde(rename = "Consumo punta", default)]
    pub peak_consumption: Option<String>,
    #[serde(rename = "TOTAL KWh (suma b,i,p)", default)]
    pub total_consumption: Option<String>,
    #[serde(rename = "Demanda Base", default)]
    pub base_demand: Option<String>,
    #[serde(rename = "Demanda intermedia", default)]
    pub intermediate_demand: Option<String>,
    #[serde(rename = "Demanda punta", default)]
    pub peak_demand: Option<String>,
    #[serde(rename = "Factor de potencia", default)]
    pub power_factor: Option<String>,
    #[serde(rename = "Factor de carga", default)]
    pub load_factor: Option<String>,
    #[serde(rename = "Carga contratada (KW)", default)]
    pub contracted_load: Option<String>,
    #[serde(rename = "SUBTOTAL", default)]
    pub subtotal: Option<String>,
    #[serde(rename = "IVA 8%", default)]
    pub tax: Option<String>,
    #[serde(rename = "DAP", default)]
    pub dap: Option<String>,
    #[serde(rename = "Cargos y depósitos", default)]
    pub fees_and_deposits: Option<String>,
    #[serde(rename = "Créditos y redondeos", default)]
    pub credits_and_roundoffs: Option<String>,
    #[serde(rename = "TOTAL RECIBO", default)]
    pub total_bill: Option<String>,
}

/// Billing column headers, used to warn about columns a current-period file
/// does not carry.
pub const BILLING_COLUMNS: [&str; 6] = [
    "SUBTOTAL",
    "IVA 8%",
    "DAP",
    "Cargos y depósitos",
    "Créditos y redondeos",
    "TOTAL RECIBO",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Demand {
    pub base_kw: f64,
    pub intermediate_kw: f64,
    pub peak_kw: f64,
}

impl Demand {
    pub fn total(&self) -> f64 {
        self.base_kw + self.intermediate_kw + self.peak_kw
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Billing {
    pub subtotal: f64,
    pub tax: f64,
    pub dap: f64,
    pub fees_and_deposits: f64,
    pub credits_and_roundoffs: f64,
    /// Invoice total as stated in the file.
    pub total_bill: f64,
}

impl Billing {
    /// Sum of the individual line items. The report shows this rather than
    /// the stated total, which is sometimes stale in the extraction.
    pub fn computed_total(&self) -> f64 {
        self.subtotal + self.tax + self.dap + self.fees_and_deposits + self.credits_and_roundoffs
    }
}

/// One month of a site's history, with every numeric field coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub period: Month,
    pub total_consumption_kwh: f64,
    pub base_consumption_kwh: f64,
    pub intermediate_consumption_kwh: f64,
    pub peak_consumption_kwh: f64,
    pub power_factor_pct: f64,
    pub load_factor_pct: f64,
    pub kwh: f64,
    pub kvarh: f64,
    pub demand: Demand,
    pub contracted_load_kw: f64,
}

impl MonthlyRecord {
    /// Record with the fields the analysis engine reads; everything else zero.
    pub fn new(period: Month, total_kwh: f64, power_factor_pct: f64, load_factor_pct: f64) -> Self {
        Self {
            period,
            total_consumption_kwh: total_kwh,
            base_consumption_kwh: 0.0,
            intermediate_consumption_kwh: 0.0,
            peak_consumption_kwh: 0.0,
            power_factor_pct,
            load_factor_pct,
            kwh: 0.0,
            kvarh: 0.0,
            demand: Demand::default(),
            contracted_load_kw: 0.0,
        }
    }
}

/// The billing period under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentPeriodMetrics {
    pub period: Option<Month>,
    pub total_consumption_kwh: f64,
    pub base_consumption_kwh: f64,
    pub intermediate_consumption_kwh: f64,
    pub peak_consumption_kwh: f64,
    pub power_factor_pct: f64,
    pub load_factor_pct: f64,
    pub demand: Demand,
    pub billing: Billing,
}

impl CurrentPeriodMetrics {
    pub fn consumption_sum(&self) -> f64 {
        self.base_consumption_kwh + self.intermediate_consumption_kwh + self.peak_consumption_kwh
    }
}

/// Everything loaded for one site.
#[derive(Debug, Clone)]
pub struct SiteData {
    pub site: String,
    pub history: Vec<MonthlyRecord>,
    pub current: CurrentPeriodMetrics,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct HistoryRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "TotalKWh")]
    #[tabled(rename = "TotalKWh")]
    pub total_kwh: String,
    #[serde(rename = "BaseKWh")]
    #[tabled(rename = "BaseKWh")]
    pub base_kwh: String,
    #[serde(rename = "IntermediateKWh")]
    #[tabled(rename = "IntermediateKWh")]
    pub intermediate_kwh: String,
    #[serde(rename = "PeakKWh")]
    #[tabled(rename = "PeakKWh")]
    pub peak_kwh: String,
    #[serde(rename = "PowerFactor")]
    #[tabled(rename = "PowerFactor")]
    pub power_factor: String,
    #[serde(rename = "LoadFactor")]
    #[tabled(rename = "LoadFactor")]
    pub load_factor: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistributionRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub bucket: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TouShareRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "BasePct")]
    #[tabled(rename = "BasePct")]
    pub base_pct: String,
    #[serde(rename = "IntermediatePct")]
    #[tabled(rename = "IntermediatePct")]
    pub intermediate_pct: String,
    #[serde(rename = "PeakPct")]
    #[tabled(rename = "PeakPct")]
    pub peak_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CostRow {
    #[serde(rename = "Concept")]
    #[tabled(rename = "Concept")]
    pub concept: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}
