//! RT/m/z bounding boxes of the mass traces of selected candidates.

use crate::assay::library::AssayLibrary;
use crate::detection::candidate::CandidateDetection;
use crate::error::{FinderError, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassTraceBounds {
    pub rt_min: f64,
    pub rt_max: f64,
    pub mz_min: f64,
    pub mz_max: f64,
}

impl MassTraceBounds {
    /// Closed rectangles: touching edges count as overlap.
    pub fn overlaps(&self, other: &MassTraceBounds) -> bool {
        !(self.rt_max < other.rt_min
            || self.rt_min > other.rt_max
            || self.mz_max < other.mz_min
            || self.mz_min > other.mz_max)
    }
}

/// True if any trace box of `a` overlaps any trace box of `b`.
pub fn has_overlapping_bounds(a: &[MassTraceBounds], b: &[MassTraceBounds]) -> bool {
    a.iter().any(|ba| b.iter().any(|bb| ba.overlaps(bb)))
}

/// Bounding boxes of all usable mass traces, one list per candidate.
///
/// The RT extent of a trace runs from its first to its last profile point with
/// positive intensity, the m/z extent is the min/max of its reported m/z values.
/// Traces without positive intensity or without m/z extent are left out.
///
/// Fails if a candidate has no traces or a trace lacks its elution profile, which
/// means the detector did not deliver what overlap resolution needs.
pub fn compute_feature_bounds(
    candidates: &[CandidateDetection],
    library: &AssayLibrary,
) -> Result<Vec<Vec<MassTraceBounds>>> {
    candidates
        .iter()
        .map(|candidate| {
            let missing = |reason: &str| {
                let candidate_ref = library
                    .get(candidate.target)
                    .map_or_else(|| candidate.target.to_string(), |t| t.reference());
                FinderError::MissingInformation {
                    candidate: format!("{} (RT {})", candidate_ref, candidate.rt as f32),
                    reason: reason.to_string(),
                }
            };

            if candidate.traces.is_empty() {
                return Err(missing("no mass traces"));
            }

            let mut bounds = Vec::with_capacity(candidate.traces.len());
            for trace in &candidate.traces {
                let profile = trace
                    .elution_profile
                    .as_ref()
                    .ok_or_else(|| missing("mass trace without elution profile"))?;

                let mut positive = profile.iter().filter(|(_, intensity)| *intensity > 0.0);
                let Some(&(rt_min, _)) = positive.next() else { continue };
                let rt_max = positive.last().map_or(rt_min, |&(rt, _)| rt);
                if rt_min > rt_max {
                    continue;
                }

                if trace.mz_extent.is_empty() {
                    continue;
                }
                let mz_min = trace.mz_extent.iter().copied().fold(f64::INFINITY, f64::min);
                let mz_max = trace.mz_extent.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                bounds.push(MassTraceBounds { rt_min, rt_max, mz_min, mz_max });
            }
            Ok(bounds)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assay::target::TargetId;
    use crate::detection::candidate::MassTrace;

    fn bounds(rt_min: f64, rt_max: f64, mz_min: f64, mz_max: f64) -> MassTraceBounds {
        MassTraceBounds { rt_min, rt_max, mz_min, mz_max }
    }

    #[test]
    fn test_overlaps() {
        let a = bounds(10.0, 20.0, 100.0, 100.1);
        assert!(a.overlaps(&bounds(15.0, 25.0, 100.05, 100.2)));
        // shared edge
        assert!(a.overlaps(&bounds(20.0, 30.0, 100.1, 100.2)));
        assert!(!a.overlaps(&bounds(21.0, 30.0, 100.0, 100.1)));
        assert!(!a.overlaps(&bounds(10.0, 20.0, 100.2, 100.3)));
    }

    #[test]
    fn test_any_trace_pair() {
        let a = vec![bounds(10.0, 20.0, 100.0, 100.1), bounds(10.0, 20.0, 101.0, 101.1)];
        let b = vec![bounds(15.0, 25.0, 101.05, 101.2)];
        let c = vec![bounds(15.0, 25.0, 102.0, 102.1)];
        assert!(has_overlapping_bounds(&a, &b));
        assert!(!has_overlapping_bounds(&a, &c));
        assert!(!has_overlapping_bounds(&a, &[]));
    }

    #[test]
    fn test_compute_feature_bounds() {
        let library = AssayLibrary::default();
        let candidate = CandidateDetection::new(TargetId(0), 300.0, 181.07, 1000.0, 280.0, 320.0)
            .with_trace(
                MassTrace::new(0, 181.07, 800.0)
                    .with_elution_profile(vec![(280.0, 0.0), (285.0, 10.0), (300.0, 800.0), (315.0, 5.0), (320.0, 0.0)])
                    .with_mz_extent(181.069, 181.071),
            )
            .with_trace(
                MassTrace::new(1, 182.07, 0.0)
                    .with_elution_profile(vec![(280.0, 0.0), (320.0, 0.0)])
                    .with_mz_extent(182.069, 182.071),
            );

        let all = compute_feature_bounds(&[candidate], &library).unwrap();
        assert_eq!(all.len(), 1);
        // the all-zero trace contributes no box
        assert_eq!(all[0], vec![bounds(285.0, 315.0, 181.069, 181.071)]);
    }

    #[test]
    fn test_missing_profile_is_fatal() {
        let library = AssayLibrary::default();
        let candidate = CandidateDetection::new(TargetId(0), 300.0, 181.07, 1000.0, 280.0, 320.0)
            .with_trace(MassTrace::new(0, 181.07, 800.0).with_mz_extent(181.069, 181.071));
        let err = compute_feature_bounds(&[candidate], &library).unwrap_err();
        assert!(matches!(err, FinderError::MissingInformation { .. }));

        let bare = CandidateDetection::new(TargetId(0), 300.0, 181.07, 1000.0, 280.0, 320.0);
        assert!(compute_feature_bounds(&[bare], &library).is_err());
    }
}
