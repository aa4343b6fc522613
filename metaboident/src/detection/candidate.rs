use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::assay::target::TargetId;

/// Observation of one transition (isotope) within a candidate detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassTrace {
    pub isotope: usize,
    pub mz: f64,
    pub intensity: f64,
    /// (RT, intensity) points of the trace in RT order, `None` if not reported
    pub elution_profile: Option<Vec<(f64, f64)>>,
    /// m/z values covered by the trace
    pub mz_extent: Vec<f64>,
    /// Theoretical abundance of the isotope, filled in by annotation
    pub isotope_probability: Option<f64>,
}

impl MassTrace {
    pub fn new(isotope: usize, mz: f64, intensity: f64) -> Self {
        MassTrace {
            isotope,
            mz,
            intensity,
            elution_profile: None,
            mz_extent: Vec::new(),
            isotope_probability: None,
        }
    }

    pub fn with_elution_profile(mut self, profile: Vec<(f64, f64)>) -> Self {
        self.elution_profile = Some(profile);
        self
    }

    pub fn with_mz_extent(mut self, mz_min: f64, mz_max: f64) -> Self {
        self.mz_extent = vec![mz_min, mz_max];
        self
    }
}

/// Metadata attached to a candidate on its way through selection and overlap resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnnotations {
    pub label: String,
    pub sum_formula: String,
    pub expected_rt: f64,
    /// expected RT - observed RT, set for selected candidates
    pub rt_deviation: Option<f64>,
    pub num_mass_traces: usize,
    /// Competitors removed because they overlapped this candidate, as "<ref> (RT <rt>)"
    pub overlap_removed: Vec<String>,
    /// Further targets explained by this same detection
    pub alt_targets: Vec<TargetId>,
    /// Marked for removal from the result set
    pub remove: bool,
}

/// One detection of an assay, as reported by the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateDetection {
    pub target: TargetId,
    /// Apex retention time
    pub rt: f64,
    pub mz: f64,
    pub intensity: f64,
    /// RT window of the detected elution peak
    pub left_width: f64,
    pub right_width: f64,
    pub charge: i32,
    pub traces: Vec<MassTrace>,
    pub meta: CandidateAnnotations,
}

impl CandidateDetection {
    pub fn new(target: TargetId, rt: f64, mz: f64, intensity: f64, left_width: f64, right_width: f64) -> Self {
        CandidateDetection {
            target,
            rt,
            mz,
            intensity,
            left_width,
            right_width,
            charge: 0,
            traces: Vec::new(),
            meta: CandidateAnnotations::default(),
        }
    }

    pub fn with_trace(mut self, trace: MassTrace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn contains_rt(&self, rt: f64) -> bool {
        self.left_width <= rt && self.right_width >= rt
    }

    /// Distance from the RT window to `rt`, zero if the window contains it.
    pub fn rt_distance(&self, rt: f64) -> f64 {
        if self.contains_rt(rt) {
            0.0
        } else if self.left_width > rt {
            self.left_width - rt
        } else {
            rt - self.right_width
        }
    }

    pub fn abs_rt_deviation(&self) -> f64 {
        self.meta.rt_deviation.map_or(f64::INFINITY, f64::abs)
    }
}

/// Order by target, then by RT. Puts all candidates of one assay next to each other.
pub fn compare_by_target_and_rt(a: &CandidateDetection, b: &CandidateDetection) -> Ordering {
    a.target
        .cmp(&b.target)
        .then_with(|| a.rt.partial_cmp(&b.rt).unwrap_or(Ordering::Equal))
}

pub fn sort_by_target_and_rt(candidates: &mut [CandidateDetection]) {
    candidates.sort_by(compare_by_target_and_rt);
}

/// Drop all candidates marked for removal, keeping the order of the rest.
pub fn purge_marked(candidates: &mut Vec<CandidateDetection>) -> usize {
    let before = candidates.len();
    candidates.retain(|c| !c.meta.remove);
    before - candidates.len()
}
