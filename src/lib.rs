//! Energy diagnostics for well sites: load the per-site billing extracts,
//! run the rule engine and render or export the resulting report.
pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod observability;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
