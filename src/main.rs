// Entry point and high-level CLI flow.
//
// With `--site` one report is printed (and exported) and the program exits.
// Without it the interactive menu runs:
// - Option [1] picks a site and loads its two CSV files.
// - Option [2] prints the diagnostic report and exports it.
// - After a report the user can go back to the menu or exit.
use anyhow::{bail, Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use pozo_report::analysis::Severity;
use pozo_report::config::AppConfig;
use pozo_report::types::SiteData;
use pozo_report::{loader, observability, output, reports, util};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pozo-report", about = "Energy diagnostics report for well sites")]
struct Cli {
    /// TOML config file (defaults to $POZO_REPORT_CONFIG or ./pozo-report.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with historial_<site>.csv and pozo_<site>.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for exported reports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Report on this site (name or catalog number) and exit
    #[arg(long)]
    site: Option<String>,

    /// Print the site catalog and exit
    #[arg(long)]
    list_sites: bool,

    /// Print the report without writing export files
    #[arg(long)]
    no_export: bool,
}

// Loaded site kept between menu actions so a report can be regenerated
// without reading the files again.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<SiteData>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after a report.
///
/// Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_catalog(cfg: &AppConfig) {
    for (i, site) in cfg.sites.iter().enumerate() {
        println!("{:>4}  {}", i + 1, site);
    }
    println!();
}

fn load_site(cfg: &AppConfig, site: &str) -> Result<SiteData> {
    let (data, load_report) = loader::load_site(&cfg.data_dir, site)
        .with_context(|| format!("loading data for site {}", site))?;
    println!(
        "Loaded {} ({} months of history, {} rows skipped)",
        site,
        util::format_int(load_report.history_rows),
        util::format_int(load_report.skipped_rows)
    );
    if load_report.coerced_values > 0 {
        println!(
            "Note: {} non-numeric values were read as 0.",
            util::format_int(load_report.coerced_values)
        );
    }
    println!();
    Ok(data)
}

/// Print the report for `data` and, unless disabled, export it.
fn run_report(cfg: &AppConfig, data: &SiteData, export: bool) -> Result<()> {
    let report = reports::build_site_report(data);
    output::print_site_report(&report, cfg.preview_rows);

    let alerts = report.findings.count_by_severity(Severity::Alert);
    let warnings = report.findings.count_by_severity(Severity::Warning);
    info!(site = %report.site, alerts, warnings, "report generated");

    if export {
        let paths = output::export_site_report(&report, &cfg.output_dir)
            .with_context(|| format!("exporting report for {}", report.site))?;
        for p in paths {
            println!("(Exported to {})", p.display());
        }
        println!();
    }
    Ok(())
}

/// Handle option [1]: choose a site and load its files into `APP_STATE`.
fn handle_select(cfg: &AppConfig) {
    print_catalog(cfg);
    let answer = read_line("Site (number or name): ");
    let Some(site) = cfg.resolve_site(&answer) else {
        println!("Unknown site: {}\n", answer);
        return;
    };
    match load_site(cfg, site) {
        Ok(data) => app_state().data = Some(data),
        Err(e) => eprintln!("Failed to load site: {:#}\n", e),
    }
}

/// Handle option [2]: report on the loaded site.
fn handle_generate(cfg: &AppConfig, export: bool) {
    let data = app_state().data.clone();
    let Some(data) = data else {
        println!("Error: No site loaded. Please select a site first (option 1).\n");
        return;
    };
    if let Err(e) = run_report(cfg, &data, export) {
        eprintln!("Report error: {:#}\n", e);
    }
}

fn interactive(cfg: &AppConfig, export: bool) {
    loop {
        println!("Well Energy Diagnostics:");
        println!("[1] Select site");
        println!("[2] Generate report\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_select(cfg),
            "2" => {
                println!();
                handle_generate(cfg, export);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let mut cfg = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }

    if cli.list_sites {
        print_catalog(&cfg);
        return Ok(());
    }

    let export = !cli.no_export;
    match cli.site {
        Some(name) => {
            let Some(site) = cfg.resolve_site(&name) else {
                bail!("unknown site {:?} (use --list-sites)", name);
            };
            let data = load_site(&cfg, site)?;
            run_report(&cfg, &data, export)
        }
        None => {
            interactive(&cfg, export);
            Ok(())
        }
    }
}
