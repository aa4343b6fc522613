//! Best-candidate selection per assay.
//!
//! A candidate whose RT window contains the expected RT has distance zero, any other
//! candidate the gap between its window and the expected RT. The closest candidate
//! wins, ties go to the more intense one.

use crate::assay::library::AssayLibrary;
use crate::assay::target::TargetInfo;
use crate::detection::candidate::{purge_marked, CandidateDetection};
use crate::error::{FinderError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub n_removed: usize,
    /// Assays with more than one candidate containing the expected RT
    pub n_ambiguous: usize,
}

/// Keep exactly one candidate per assay and drop the rest.
///
/// Candidates of the same target must be contiguous (e.g. sorted with
/// [`sort_by_target_and_rt`](crate::detection::candidate::sort_by_target_and_rt)).
/// `rt_window` is the global RT window width; a candidate further away than that is
/// only kept if nothing closer exists.
pub fn select_best_candidates(
    candidates: &mut Vec<CandidateDetection>,
    library: &AssayLibrary,
    rt_window: f64,
) -> Result<SelectionSummary> {
    let mut n_ambiguous = 0;
    let mut start = 0;
    while start < candidates.len() {
        let target_id = candidates[start].target;
        let len = candidates[start..].iter().take_while(|c| c.target == target_id).count();
        let target = library.get(target_id).ok_or_else(|| FinderError::MissingInformation {
            candidate: format!("target {}", target_id),
            reason: "candidate refers to a target that is not in the assay library".to_string(),
        })?;

        if select_in_group(&mut candidates[start..start + len], target, rt_window) {
            n_ambiguous += 1;
        }
        start += len;
    }

    Ok(SelectionSummary { n_removed: purge_marked(candidates), n_ambiguous })
}

/// Returns true if several candidates contain the expected RT.
fn select_in_group(group: &mut [CandidateDetection], target: &TargetInfo, rt_window: f64) -> bool {
    let expected_rt = target.expected_rt;
    let mut best_rt_dist = rt_window;
    let mut best = 0;
    let mut ambiguous = false;

    for (i, candidate) in group.iter().enumerate() {
        let rt_dist = candidate.rt_distance(expected_rt);
        if rt_dist == 0.0 && best_rt_dist <= 0.0 {
            log::warn!(
                "Warning: overlapping feature candidates for assay '{}' (RT {} and {})",
                target.reference(),
                group[best].rt as f32,
                candidate.rt as f32
            );
            ambiguous = true;
        }
        if rt_dist < best_rt_dist || (rt_dist == best_rt_dist && candidate.intensity > group[best].intensity) {
            best_rt_dist = rt_dist;
            best = i;
        }
    }

    for (i, candidate) in group.iter_mut().enumerate() {
        if i == best {
            candidate.meta.rt_deviation = Some(expected_rt - candidate.rt);
        } else {
            candidate.meta.remove = true;
        }
    }
    ambiguous
}
