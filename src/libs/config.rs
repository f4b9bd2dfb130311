//! Flat named options shared by the annotation jobs.
//!
//! A config file holds one `KEY VALUE` pair per line. Key and value may be
//! separated by a tab, spaces or `=`; `#` starts a comment line.
//!
//! ```text
//! MIN_COVERAGE        90
//! MIN_PERCENT_ID      97
//! BEST_IN_GENOME      1
//! EST_COVERAGE_CUTOFF 80
//! DISTANCE_TWILIGHT   0.02
//! DISTANCE_CLASS      informative
//! ```

use crate::libs::distance::DistanceClass;
use crate::libs::error::GarError;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub min_coverage: f64,
    pub min_percent_id: f64,
    pub best_in_genome: bool,
    /// Always a fraction after [`Config::validate`]
    pub est_coverage_cutoff: f64,
    pub distance_twilight: f64,
    pub distance_class: DistanceClass,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_coverage: 90.0,
            min_percent_id: 97.0,
            best_in_genome: true,
            est_coverage_cutoff: 0.8,
            distance_twilight: 0.02,
            distance_class: DistanceClass::InformativeSites,
        }
    }
}

impl Config {
    /// Loads a flat config file on top of the defaults
    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        let mut config = Config::default();
        for line in crate::libs::io::read_data_lines(infile)? {
            let (key, value) = split_pair(&line).ok_or_else(|| GarError::InvalidConfig {
                key: line.trim().to_string(),
                value: String::new(),
            })?;
            config.set(key, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets one option by its upper-case name.
    ///
    /// ```
    /// # use gar::libs::config::Config;
    /// let mut config = Config::default();
    /// config.set("MIN_COVERAGE", "85").unwrap();
    /// config.set("BEST_IN_GENOME", "no").unwrap();
    /// assert_eq!(config.min_coverage, 85.0);
    /// assert!(!config.best_in_genome);
    /// assert!(config.set("MAX_FUN", "1").is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), GarError> {
        let invalid = || GarError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        };
        let number = || value.parse::<f64>().map_err(|_| invalid());

        match key.to_ascii_uppercase().as_str() {
            "MIN_COVERAGE" => self.min_coverage = number()?,
            "MIN_PERCENT_ID" => self.min_percent_id = number()?,
            "BEST_IN_GENOME" => self.best_in_genome = parse_bool(value).ok_or_else(invalid)?,
            "EST_COVERAGE_CUTOFF" => self.est_coverage_cutoff = number()?,
            "DISTANCE_TWILIGHT" => self.distance_twilight = number()?,
            "DISTANCE_CLASS" => self.distance_class = value.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        }
        debug!("config {} = {}", key, value);
        Ok(())
    }

    /// Normalises percentages and checks value domains
    pub fn validate(&mut self) -> Result<(), GarError> {
        self.est_coverage_cutoff = normalize_cutoff(self.est_coverage_cutoff);

        let check = |key: &str, value: f64, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(GarError::InvalidConfig {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        };
        check("MIN_COVERAGE", self.min_coverage, self.min_coverage >= 0.0)?;
        check(
            "MIN_PERCENT_ID",
            self.min_percent_id,
            self.min_percent_id >= 0.0,
        )?;
        check(
            "EST_COVERAGE_CUTOFF",
            self.est_coverage_cutoff,
            (0.0..=1.0).contains(&self.est_coverage_cutoff),
        )?;
        check(
            "DISTANCE_TWILIGHT",
            self.distance_twilight,
            (0.0..=1.0).contains(&self.distance_twilight),
        )?;
        Ok(())
    }
}

/// Cutoffs above 1 are percentages.
///
/// ```
/// # use gar::libs::config::normalize_cutoff;
/// assert_eq!(normalize_cutoff(80.0), 0.8);
/// assert_eq!(normalize_cutoff(0.8), 0.8);
/// assert_eq!(normalize_cutoff(1.0), 1.0);
/// ```
pub fn normalize_cutoff(cutoff: f64) -> f64 {
    if cutoff > 1.0 {
        cutoff / 100.0
    } else {
        cutoff
    }
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let idx = line.find(|c: char| c == '=' || c.is_whitespace())?;
    let key = line[..idx].trim();
    let value = line[idx + 1..].trim_start_matches(|c: char| c == '=' || c.is_whitespace());
    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value.trim()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_coverage, 90.0);
        assert_eq!(config.min_percent_id, 97.0);
        assert!(config.best_in_genome);
        assert_eq!(config.est_coverage_cutoff, 0.8);
        assert_eq!(config.distance_twilight, 0.02);
        assert_eq!(config.distance_class, DistanceClass::InformativeSites);
    }

    #[test]
    fn test_percentage_cutoff_is_normalized() {
        let mut config = Config::default();
        config.set("EST_COVERAGE_CUTOFF", "80").unwrap();
        config.validate().unwrap();
        assert_eq!(config.est_coverage_cutoff, 0.8);

        let mut other = Config::default();
        other.set("EST_COVERAGE_CUTOFF", "0.8").unwrap();
        other.validate().unwrap();
        assert_eq!(config, other);
    }

    #[test]
    fn test_validate_rejects_bad_twilight() {
        let mut config = Config::default();
        config.distance_twilight = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GarError::InvalidConfig { .. }));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("A\t1"), Some(("A", "1")));
        assert_eq!(split_pair("A = 1"), Some(("A", "1")));
        assert_eq!(split_pair("A   1 "), Some(("A", "1")));
        assert_eq!(split_pair("A"), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# pseudogene thresholds").unwrap();
        writeln!(file, "MIN_COVERAGE\t80").unwrap();
        writeln!(file, "MIN_PERCENT_ID = 95").unwrap();
        writeln!(file, "BEST_IN_GENOME false").unwrap();
        writeln!(file, "EST_COVERAGE_CUTOFF 90").unwrap();
        writeln!(file, "DISTANCE_CLASS nucleotide").unwrap();
        file.flush().unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.min_coverage, 80.0);
        assert_eq!(config.min_percent_id, 95.0);
        assert!(!config.best_in_genome);
        assert_eq!(config.est_coverage_cutoff, 0.9);
        assert_eq!(config.distance_class, DistanceClass::Nucleotide);
    }
}
