//! Run parameters.
//!
//! All options of a run live in one explicit struct that is handed to each stage,
//! so there is no process-wide state.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};

/// Feature finding configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderParams {
    /// RT window width (s) around each expected RT; 0 means `4 * peak_width`
    pub rt_window: f64,
    /// m/z window for extraction: ppm if 1 or greater, else Th
    pub mz_window: f64,
    /// Isotopes per assay when no probability threshold is set (at least 2)
    pub n_isotopes: usize,
    /// Minimum isotope probability; if > 0 it takes precedence over `n_isotopes`
    pub isotope_pmin: f64,

    /// Expected elution peak width (s)
    pub peak_width: f64,
    /// Minimum elution peak width: seconds if 1 or greater, else relative to `peak_width`
    pub min_peak_width: f64,
    /// Signal-to-noise threshold forwarded to the detector
    pub signal_to_noise: f64,

    /// Optional output of all candidates before selection
    pub candidates_out: Option<PathBuf>,
}

impl Default for FinderParams {
    fn default() -> Self {
        Self {
            rt_window: 0.0,
            mz_window: 10.0,
            n_isotopes: 2,
            isotope_pmin: 0.0,
            peak_width: 60.0,
            min_peak_width: 0.2,
            signal_to_noise: 0.8,
            candidates_out: None,
        }
    }
}

/// Options for the external chromatogram extraction and peak detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub rt_window: f64,
    pub mz_window: f64,
    pub mz_window_ppm: bool,
    pub peak_width: f64,
    /// Absolute minimum peak width in seconds
    pub min_peak_width: f64,
    pub signal_to_noise: f64,
}

impl FinderParams {
    /// Load parameters from a JSON file; missing fields take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let params: FinderParams = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let check = |ok: bool, name: &'static str, message: &str| {
            if ok {
                Ok(())
            } else {
                Err(FinderError::InvalidParameter { name, message: message.to_string() })
            }
        };
        check(self.rt_window >= 0.0, "rt_window", "must not be negative")?;
        check(self.mz_window >= 0.0, "mz_window", "must not be negative")?;
        check(self.n_isotopes >= 2, "n_isotopes", "must be at least 2")?;
        check((0.0..=1.0).contains(&self.isotope_pmin), "isotope_pmin", "must be between 0 and 1")?;
        check(self.peak_width >= 0.0, "peak_width", "must not be negative")?;
        check(self.min_peak_width >= 0.0, "min_peak_width", "must not be negative")?;
        check(self.signal_to_noise >= 0.1, "signal_to_noise", "must be at least 0.1")?;
        Ok(())
    }

    /// RT window width actually used for targets without an explicit range.
    pub fn effective_rt_window(&self) -> f64 {
        if self.rt_window == 0.0 {
            4.0 * self.peak_width
        } else {
            self.rt_window
        }
    }

    /// Number of isotopes computed per target before probability trimming.
    pub fn effective_n_isotopes(&self) -> usize {
        if self.isotope_pmin > 0.0 {
            10
        } else {
            self.n_isotopes
        }
    }

    pub fn mz_window_ppm(&self) -> bool {
        self.mz_window >= 1.0
    }

    /// Half of the m/z window, in Th, at the given m/z.
    pub fn mz_tolerance(&self, mz: f64) -> f64 {
        let half = self.mz_window / 2.0;
        if self.mz_window_ppm() {
            mz * half * 1.0e-6
        } else {
            half
        }
    }

    pub fn detection_params(&self) -> DetectionParams {
        let min_peak_width = if self.min_peak_width < 1.0 {
            self.min_peak_width * self.peak_width
        } else {
            self.min_peak_width
        };
        DetectionParams {
            rt_window: self.effective_rt_window(),
            mz_window: self.mz_window,
            mz_window_ppm: self.mz_window_ppm(),
            peak_width: self.peak_width,
            min_peak_width,
            signal_to_noise: self.signal_to_noise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = FinderParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.effective_rt_window(), 240.0);
        assert_eq!(params.effective_n_isotopes(), 2);
        assert!(params.mz_window_ppm());
    }

    #[test]
    fn test_pmin_takes_precedence() {
        let params = FinderParams { isotope_pmin: 0.05, ..Default::default() };
        assert_eq!(params.effective_n_isotopes(), 10);
    }

    #[test]
    fn test_mz_tolerance_units() {
        let ppm = FinderParams { mz_window: 10.0, ..Default::default() };
        assert!((ppm.mz_tolerance(500.0) - 0.0025).abs() < 1e-12);

        let th = FinderParams { mz_window: 0.02, ..Default::default() };
        assert_eq!(th.mz_tolerance(500.0), 0.01);
    }

    #[test]
    fn test_relative_min_peak_width() {
        let params = FinderParams { peak_width: 10.0, min_peak_width: 0.5, ..Default::default() };
        assert_eq!(params.detection_params().min_peak_width, 5.0);
    }

    #[test]
    fn test_invalid_params() {
        let params = FinderParams { n_isotopes: 1, ..Default::default() };
        assert!(matches!(params.validate(), Err(FinderError::InvalidParameter { name: "n_isotopes", .. })));

        let params = FinderParams { isotope_pmin: 1.5, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"mz_window": 0.01, "candidates_out": "candidates.json"}"#).unwrap();

        let params = FinderParams::from_json_file(&path).unwrap();
        assert_eq!(params.mz_window, 0.01);
        assert!(!params.mz_window_ppm());
        assert_eq!(params.candidates_out, Some(PathBuf::from("candidates.json")));

        std::fs::write(&path, r#"{"n_isotopes": 1}"#).unwrap();
        assert!(FinderParams::from_json_file(&path).is_err());
    }

    #[test]
    fn test_partial_json() {
        let params: FinderParams = serde_json::from_str(r#"{"rt_window": 60.0, "isotope_pmin": 0.01}"#).unwrap();
        assert_eq!(params.rt_window, 60.0);
        assert_eq!(params.n_isotopes, 2);
        assert_eq!(params.effective_rt_window(), 60.0);
    }
}
