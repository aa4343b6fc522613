//! Target metadata on candidates and the per-run summaries derived from the final features.

use std::collections::{HashMap, HashSet};

use mscore::chemistry::formulas::calculate_mz;
use serde::{Deserialize, Serialize};

use crate::assay::library::AssayLibrary;
use crate::assay::target::TargetId;
use crate::detection::candidate::CandidateDetection;
use crate::error::{FinderError, Result};
use crate::params::FinderParams;

/// An assay without a feature in the final result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnassignedTarget {
    pub target: TargetId,
    pub label: String,
    pub reference: String,
    pub expected_rt: f64,
    pub expected_mz: f64,
}

/// Expected vs. observed RT of one feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RtTransformationPoint {
    pub expected_rt: f64,
    pub observed_rt: f64,
    pub reference: String,
}

/// Copy target metadata onto each candidate and its mass traces.
///
/// Traces without m/z extent get one of the width of the m/z window around their m/z.
pub fn annotate_candidates(
    candidates: &mut [CandidateDetection],
    library: &AssayLibrary,
    params: &FinderParams,
) -> Result<()> {
    let isotope_probabilities: HashMap<(TargetId, usize), f64> = library
        .transitions()
        .iter()
        .map(|t| ((t.target, t.isotope), t.library_intensity))
        .collect();

    for candidate in candidates.iter_mut() {
        let target = library.get(candidate.target).ok_or_else(|| FinderError::MissingInformation {
            candidate: format!("target {} (RT {})", candidate.target, candidate.rt as f32),
            reason: "candidate refers to a target that is not in the assay library".to_string(),
        })?;

        candidate.charge = target.charge;
        candidate.meta.label = target.name.clone();
        candidate.meta.sum_formula = target.formula.clone();
        candidate.meta.expected_rt = target.expected_rt;
        candidate.meta.num_mass_traces = candidate.traces.len();

        let id = candidate.target;
        for trace in candidate.traces.iter_mut() {
            trace.isotope_probability = isotope_probabilities.get(&(id, trace.isotope)).copied();

            if trace.mz_extent.is_empty() {
                let tol = params.mz_tolerance(trace.mz);
                trace.mz_extent = vec![trace.mz - tol, trace.mz + tol];
            }
        }
    }
    Ok(())
}

/// Targets not explained by any feature, and the number of features explaining more
/// than one target.
pub fn add_target_annotations(
    features: &[CandidateDetection],
    library: &AssayLibrary,
) -> (Vec<UnassignedTarget>, usize) {
    let assigned: HashSet<TargetId> = features
        .iter()
        .flat_map(|f| std::iter::once(f.target).chain(f.meta.alt_targets.iter().copied()))
        .collect();

    let unassigned = library
        .targets()
        .iter()
        .filter(|t| !assigned.contains(&t.id))
        .map(|t| UnassignedTarget {
            target: t.id,
            label: t.name.clone(),
            reference: t.reference(),
            expected_rt: t.expected_rt,
            expected_mz: calculate_mz(t.mass, t.charge),
        })
        .collect();

    let n_shared = features.iter().filter(|f| !f.meta.alt_targets.is_empty()).count();
    (unassigned, n_shared)
}

pub fn extract_rt_transformation(features: &[CandidateDetection], library: &AssayLibrary) -> Vec<RtTransformationPoint> {
    features
        .iter()
        .filter_map(|f| {
            library.get(f.target).map(|t| RtTransformationPoint {
                expected_rt: t.expected_rt,
                observed_rt: f.rt,
                reference: t.reference(),
            })
        })
        .collect()
}
