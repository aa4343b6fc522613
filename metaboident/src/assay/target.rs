use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle of one assay: a target at one charge state and one expected RT.
///
/// Ids are assigned in library order, so sorting by id groups all candidates of an assay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One row of the target list, as given by the user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    /// Sum formula, empty if unknown
    pub formula: String,
    /// Monoisotopic mass; values <= 0 mean "derive from the formula"
    pub mass: f64,
    pub charges: Vec<i32>,
    /// Expected retention times (s)
    pub rts: Vec<f64>,
    /// RT window widths: empty, one for all RTs, or one per RT; 0 means default
    pub rt_ranges: Vec<f64>,
    /// Isotope abundances, empty or starting with 0 if not given
    pub iso_distribution: Vec<f64>,
}

impl TargetSpec {
    pub fn new(name: &str, formula: &str, mass: f64, charges: Vec<i32>, rts: Vec<f64>) -> Self {
        TargetSpec {
            name: name.to_string(),
            formula: formula.to_string(),
            mass,
            charges,
            rts,
            ..Default::default()
        }
    }

    pub fn with_rt_ranges(mut self, rt_ranges: Vec<f64>) -> Self {
        self.rt_ranges = rt_ranges;
        self
    }

    pub fn with_iso_distribution(mut self, iso_distribution: Vec<f64>) -> Self {
        self.iso_distribution = iso_distribution;
        self
    }
}

/// Registered metadata of one assay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub id: TargetId,
    pub name: String,
    pub formula: String,
    /// Monoisotopic mass (given or derived from the formula)
    pub mass: f64,
    pub charge: i32,
    /// m/z of the monoisotopic ion
    pub mz: f64,
    pub expected_rt: f64,
    pub rt_min: f64,
    pub rt_max: f64,
}

impl TargetInfo {
    pub fn rt_window_width(&self) -> f64 {
        self.rt_max - self.rt_min
    }

    /// Human readable reference in the style `<name>_m<mass>_z<charge>_rt<rt>`.
    pub fn reference(&self) -> String {
        format!(
            "{}_m{}_z{}_rt{}",
            self.name, self.mass as f32, self.charge, self.expected_rt as f32
        )
    }
}

/// One monitored isotope channel of an assay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: TargetId,
    /// Nominal isotope number, 0 = monoisotopic
    pub isotope: usize,
    pub precursor_mz: f64,
    pub product_mz: f64,
    /// Relative abundance of the isotope, used as expected intensity
    pub library_intensity: f64,
}
