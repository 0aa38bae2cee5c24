use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "POZO_REPORT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "pozo-report.toml";

/// Wells and re-pumping stations with extracted billing data.
pub const DEFAULT_SITES: &[&str] = &[
    "1-RR", "4", "5", "5-R_CH", "6", "7-RR", "9-R", "11-R", "12", "14-R", "15-R", "16-R", "17-R",
    "23-R", "24-R", "28", "33-R", "38", "42-RR", "45", "46-R", "47-R", "48-R", "50-R", "52-R",
    "54-R", "55-R", "56-R", "58", "60", "61-R", "62-R", "63-R", "64", "66-R", "67-R", "68-R",
    "69-R", "70-R", "71-R", "72-R", "73-R", "75-R", "76", "78-R", "79-R", "80-B", "80-AR", "81-R",
    "84-R", "86-R", "87", "88", "89-R", "89-RR", "91-R", "92-R", "93-R", "94-R", "95", "96",
    "97-R", "98-R", "99-R", "100", "101", "103", "104", "106", "110", "111", "112", "113", "114",
    "115", "116", "117", "119", "120", "121", "122", "123-R", "124", "129", "130", "132", "133-R",
    "134", "135-R", "136-R", "138", "141", "142", "143", "144", "145", "146", "147", "148", "149",
    "150", "152-R", "156-R", "157", "160", "161", "163", "164", "165", "166", "167-R", "168",
    "169", "170", "171", "172", "173", "174", "176", "177", "178", "179", "180", "182", "183",
    "184-R", "185", "186", "187", "188", "190", "191", "192", "193", "194", "195", "196", "197",
    "198", "199", "200", "201", "202", "203", "REB 60", "REB 60-A", "204", "205", "206", "207",
    "208", "209", "210-R", "211", "212", "212-R", "213", "214", "215", "216", "217", "218", "219",
    "220-R", "221", "222", "223", "226", "229", "230", "231 (CEFERESO 9)", "232 (electrolux 1)",
    "233 (electrolux 2)", "234 (IVI 9)", "235 (IVI 10)", "236 (IVI 8)", "237", "238",
    "239 (IVI 12)", "240 (IVI 13)", "244", "245", "246 BODEGA POZO 19", "Pozo Loma Blanca",
    "1 ACM", "2 ACM", "3 ACM", "5 ACM", "6 ACM", "7 ACM", "9 ACM", "10 ACM", "11 ACM", "12 ACM",
    "13 ACM", "14 ACM", "15 ACM", "16 ACM", "17 ACM", "18 ACM", "19 ACM", "21 ACM", "22 ACM",
    "23 ACM", "24 ACM", "25 ACM", "26 ACM", "27 ACM", "247", "250", "251", "252", "253", "255",
    "259", "262", "263", "269", "6 Anapra", "2 Samalayuca", "3 Samalayuca", "3-ZARA-R", "4-ZARA",
    "5-ZARA(140)", "6-ZARA(151)", "7-ZARA(158)", "8-ZARA",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `historial_<site>.csv` and `pozo_<site>.csv`.
    pub data_dir: PathBuf,
    /// Where exported reports are written.
    pub output_dir: PathBuf,
    /// Rows shown in each console table preview.
    pub preview_rows: usize,
    pub sites: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("output"),
            output_dir: PathBuf::from("reports"),
            preview_rows: 8,
            sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, else `$POZO_REPORT_CONFIG`, else `pozo-report.toml`.
    ///
    /// An explicitly requested file must exist; the default file is optional
    /// and built-in defaults are used without it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match explicit {
            Some(path) => Self::from_file(&path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), sites = cfg.sites.len(), "loaded config");
        Ok(cfg)
    }

    /// Resolve a menu answer: a site name (case-insensitive) or a 1-based
    /// index into the catalog. Names win, since many sites are plain numbers.
    pub fn resolve_site(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if let Some(site) = self.sites.iter().find(|s| s.eq_ignore_ascii_case(input)) {
            return Some(site.as_str());
        }
        let idx = input.parse::<usize>().ok()?;
        idx.checked_sub(1)
            .and_then(|i| self.sites.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_the_catalog() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir, PathBuf::from("output"));
        assert_eq!(cfg.sites.first().map(String::as_str), Some("1-RR"));
        assert!(cfg.sites.iter().any(|s| s == "REB 60-A"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/srv/energia\"\nsites = [\"4\", \"5-R_CH\"]").unwrap();

        let cfg = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/energia"));
        assert_eq!(cfg.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.preview_rows, 8);
        assert_eq!(cfg.sites, vec!["4".to_string(), "5-R_CH".to_string()]);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preview_rows = \"many\"").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn sites_resolve_by_index_or_name() {
        let cfg = AppConfig {
            sites: vec!["1-RR".into(), "Pozo Loma Blanca".into()],
            ..AppConfig::default()
        };
        assert_eq!(cfg.resolve_site("2"), Some("Pozo Loma Blanca"));
        assert_eq!(cfg.resolve_site("pozo loma blanca"), Some("Pozo Loma Blanca"));
        assert_eq!(cfg.resolve_site("1-rr"), Some("1-RR"));
        assert_eq!(cfg.resolve_site("0"), None);
        assert_eq!(cfg.resolve_site("3"), None);
    }

    #[test]
    fn numeric_site_names_win_over_indexes() {
        let cfg = AppConfig {
            sites: vec!["1-RR".into(), "4".into(), "5".into(), "5-R_CH".into()],
            ..AppConfig::default()
        };
        assert_eq!(cfg.resolve_site("4"), Some("4"));
        assert_eq!(cfg.resolve_site("1"), Some("1-RR"));
    }
}
