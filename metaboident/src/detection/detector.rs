//! Boundary to the external chromatogram extraction and peak detection.
//!
//! The detector owns the spectrum source. It receives the assay library and returns a
//! flat list of candidates, each carrying one mass trace per detected transition with
//! its elution profile and m/z extent. Calls are blocking and return all candidates at
//! once.

use std::path::Path;

use crate::assay::library::AssayLibrary;
use crate::detection::candidate::CandidateDetection;
use crate::detection::io::load_candidates_json;
use crate::error::Result;
use crate::params::DetectionParams;

pub trait CandidateDetector {
    fn detect(&self, library: &AssayLibrary, params: &DetectionParams) -> Result<Vec<CandidateDetection>>;
}

impl<F> CandidateDetector for F
where
    F: Fn(&AssayLibrary, &DetectionParams) -> Result<Vec<CandidateDetection>>,
{
    fn detect(&self, library: &AssayLibrary, params: &DetectionParams) -> Result<Vec<CandidateDetection>> {
        self(library, params)
    }
}

/// Candidates from an earlier run, e.g. a candidates file written via `candidates_out`.
#[derive(Clone, Debug, Default)]
pub struct PrecomputedCandidates {
    candidates: Vec<CandidateDetection>,
}

impl PrecomputedCandidates {
    pub fn new(candidates: Vec<CandidateDetection>) -> Self {
        PrecomputedCandidates { candidates }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(PrecomputedCandidates::new(load_candidates_json(path)?))
    }
}

impl CandidateDetector for PrecomputedCandidates {
    fn detect(&self, library: &AssayLibrary, _params: &DetectionParams) -> Result<Vec<CandidateDetection>> {
        let candidates: Vec<CandidateDetection> = self
            .candidates
            .iter()
            .filter(|c| library.get(c.target).is_some())
            .cloned()
            .collect();
        if candidates.len() < self.candidates.len() {
            log::warn!(
                "Warning: {} precomputed candidate(s) refer to unknown targets and were ignored.",
                self.candidates.len() - candidates.len()
            );
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assay::library::AssayLibraryBuilder;
    use crate::assay::target::{TargetId, TargetSpec};
    use crate::detection::io::save_candidates_json;
    use crate::params::FinderParams;

    #[test_log::test]
    fn test_precomputed_candidates_skip_unknown_targets() {
        let params = FinderParams::default();
        let mut builder = AssayLibraryBuilder::new(&params);
        builder.add_target(&TargetSpec::new("Glucose", "C6H12O6", 0.0, vec![1], vec![300.0]));
        let (library, _) = builder.build();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.json");
        save_candidates_json(
            &path,
            &[
                CandidateDetection::new(TargetId(0), 300.0, 181.0625, 10.0, 290.0, 310.0),
                CandidateDetection::new(TargetId(5), 100.0, 99.5, 10.0, 90.0, 110.0),
            ],
        )
        .unwrap();

        let detector = PrecomputedCandidates::from_json_file(&path).unwrap();
        let candidates = detector.detect(&library, &params.detection_params()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, TargetId(0));
    }
}
