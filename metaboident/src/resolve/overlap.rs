//! Resolution of selected candidates that claim the same signal.
//!
//! Candidates whose trace boxes overlap (directly or through a chain of overlaps) form
//! a group. Within a group the candidate closest to its expected RT is kept, and every
//! group member overlapping it is dropped. Members that do not overlap the winner
//! compete again in the next round.

use std::collections::HashMap;

use crate::assay::library::AssayLibrary;
use crate::detection::candidate::{purge_marked, CandidateDetection};
use crate::resolve::bounds::{has_overlapping_bounds, MassTraceBounds};

/// Disjoint-set union over candidate indices.
struct Dsu {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl Dsu {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut x: usize) -> usize {
        let mut root = self.parent[x];
        while root != self.parent[root] {
            root = self.parent[root];
        }
        // path compression
        while x != self.parent[x] {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return false;
        }
        // union by size
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    /// Components in order of their smallest member, members ascending.
    fn groups(mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
        let mut out: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            let slot = *slot_of_root.entry(root).or_insert_with(|| {
                out.push(Vec::new());
                out.len() - 1
            });
            out[slot].push(i);
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapSummary {
    pub n_groups: usize,
    pub n_involved: usize,
    pub n_removed: usize,
    /// Identical detections whose targets were merged onto the survivor
    pub n_merged: usize,
    /// Ties between different detections, decided by order
    pub n_undecided: usize,
}

/// Indices of candidates connected by overlapping bounds; singletons are omitted.
pub fn find_overlap_groups(bounds: &[Vec<MassTraceBounds>]) -> Vec<Vec<usize>> {
    let n = bounds.len();
    let mut dsu = Dsu::new(n);
    for i in 0..n {
        for j in 0..i {
            if has_overlapping_bounds(&bounds[i], &bounds[j]) {
                dsu.union(i, j);
            }
        }
    }
    dsu.groups().into_iter().filter(|g| g.len() > 1).collect()
}

/// Resolve one overlap group in place by marking the losers for removal.
///
/// `group` indexes into `candidates` and `bounds`. Merged and undecided ties are
/// counted into `summary`.
pub fn resolve_overlap_group(
    candidates: &mut [CandidateDetection],
    group: &[usize],
    bounds: &[Vec<MassTraceBounds>],
    library: &AssayLibrary,
    summary: &mut OverlapSummary,
) {
    let mut remaining: Vec<usize> = group.to_vec();

    while !remaining.is_empty() {
        let best = remaining
            .iter()
            .copied()
            .reduce(|best, i| if is_better(&candidates[i], &candidates[best]) { i } else { best })
            .unwrap_or(remaining[0]);

        for &i in remaining.iter().filter(|&&i| i != best) {
            if !is_equally_good(&candidates[i], &candidates[best]) {
                continue;
            }
            if candidates[i].rt == candidates[best].rt && candidates[i].mz == candidates[best].mz {
                // same detection explains both targets
                let label = format!("{}/{}", candidates[best].meta.label, candidates[i].meta.label);
                let mut alt_targets = vec![candidates[i].target];
                alt_targets.extend(candidates[i].meta.alt_targets.iter().copied());
                let winner = &mut candidates[best].meta;
                winner.label = label;
                winner.alt_targets.extend(alt_targets);
                summary.n_merged += 1;
            } else {
                log::warn!(
                    "Warning: cannot decide between equally good feature candidates {} and {}; picking the first one.",
                    describe(&candidates[best], library),
                    describe(&candidates[i], library)
                );
                summary.n_undecided += 1;
            }
        }

        let mut next = Vec::with_capacity(remaining.len());
        for &i in &remaining {
            if i == best {
                continue;
            }
            if has_overlapping_bounds(&bounds[best], &bounds[i]) {
                let removed = describe(&candidates[i], library);
                candidates[best].meta.overlap_removed.push(removed);
                candidates[i].meta.remove = true;
            } else {
                next.push(i);
            }
        }
        remaining = next;
    }
}

/// Resolve all overlap groups and drop the losers.
///
/// `bounds` must be parallel to `candidates`, as returned by
/// [`compute_feature_bounds`](crate::resolve::bounds::compute_feature_bounds).
pub fn resolve_overlaps(
    candidates: &mut Vec<CandidateDetection>,
    bounds: &[Vec<MassTraceBounds>],
    library: &AssayLibrary,
) -> OverlapSummary {
    let groups = find_overlap_groups(bounds);
    if groups.is_empty() {
        log::info!("No overlaps between features found.");
        return OverlapSummary::default();
    }

    let mut summary = OverlapSummary {
        n_groups: groups.len(),
        n_involved: groups.iter().map(Vec::len).sum(),
        ..Default::default()
    };
    for group in &groups {
        log::debug!(
            "Overlap group: {}",
            group.iter().map(|&i| describe(&candidates[i], library)).collect::<Vec<_>>().join(", ")
        );
        resolve_overlap_group(candidates, group, bounds, library, &mut summary);
    }
    summary.n_removed = purge_marked(candidates);

    log::info!(
        "{} features left after resolving overlaps (involving {} features in {} groups).",
        candidates.len(),
        summary.n_involved,
        summary.n_groups
    );
    summary
}

fn is_better(a: &CandidateDetection, b: &CandidateDetection) -> bool {
    let (da, db) = (a.abs_rt_deviation(), b.abs_rt_deviation());
    da < db || (da == db && a.intensity > b.intensity)
}

fn is_equally_good(a: &CandidateDetection, b: &CandidateDetection) -> bool {
    a.abs_rt_deviation() == b.abs_rt_deviation() && a.intensity == b.intensity
}

fn describe(candidate: &CandidateDetection, library: &AssayLibrary) -> String {
    let reference = library
        .get(candidate.target)
        .map_or_else(|| candidate.target.to_string(), |t| t.reference());
    format!("{} (RT {})", reference, candidate.rt as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assay::library::AssayLibraryBuilder;
    use crate::assay::target::{TargetId, TargetSpec};
    use crate::params::FinderParams;

    fn library() -> AssayLibrary {
        let params = FinderParams { rt_window: 60.0, ..Default::default() };
        let mut builder = AssayLibraryBuilder::new(&params);
        builder.add_target(&TargetSpec::new("A", "", 300.0, vec![1], vec![100.0]));
        builder.add_target(&TargetSpec::new("B", "", 300.0, vec![1], vec![110.0]));
        builder.add_target(&TargetSpec::new("C", "", 500.0, vec![1], vec![105.0]));
        builder.build().0
    }

    fn candidate(target: usize, rt: f64, mz: f64, intensity: f64, rt_deviation: f64, label: &str) -> CandidateDetection {
        let mut c = CandidateDetection::new(TargetId(target), rt, mz, intensity, rt - 10.0, rt + 10.0);
        c.meta.rt_deviation = Some(rt_deviation);
        c.meta.label = label.to_string();
        c
    }

    fn boxed(rt: f64, mz: f64) -> Vec<MassTraceBounds> {
        vec![MassTraceBounds { rt_min: rt - 5.0, rt_max: rt + 5.0, mz_min: mz - 0.01, mz_max: mz + 0.01 }]
    }

    #[test]
    fn test_overlap_groups_are_transitive() {
        let bounds = vec![boxed(100.0, 301.0), boxed(200.0, 301.0), boxed(108.0, 301.0), boxed(116.0, 301.0)];
        // 0-2 and 2-3 overlap, 0 and 3 only through 2
        assert_eq!(find_overlap_groups(&bounds), vec![vec![0, 2, 3]]);
    }

    #[test]
    fn test_two_targets_one_signal() {
        let library = library();
        let mut candidates = vec![
            candidate(0, 102.0, 301.007, 1000.0, -2.0, "A"),
            candidate(1, 103.0, 301.007, 1000.0, 7.0, "B"),
        ];
        let bounds = vec![boxed(102.0, 301.007), boxed(103.0, 301.007)];
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);

        assert_eq!(
            summary,
            OverlapSummary { n_groups: 1, n_involved: 2, n_removed: 1, n_merged: 0, n_undecided: 0 }
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, TargetId(0));
        assert_eq!(candidates[0].meta.overlap_removed, vec!["B_m300_z1_rt110 (RT 103)".to_string()]);
    }

    #[test]
    fn test_non_overlapping_member_survives() {
        let library = library();
        // 1 overlaps 0 and 2, but 0 and 2 are apart: 0 wins round one, 2 wins round two
        let mut candidates = vec![
            candidate(0, 100.0, 301.007, 1000.0, 0.0, "A"),
            candidate(1, 108.0, 301.007, 1000.0, 2.0, "B"),
            candidate(2, 116.0, 301.007, 1000.0, -11.0, "C"),
        ];
        let bounds = vec![boxed(100.0, 301.007), boxed(108.0, 301.007), boxed(116.0, 301.007)];
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);

        assert_eq!(summary.n_removed, 1);
        let targets: Vec<TargetId> = candidates.iter().map(|c| c.target).collect();
        assert_eq!(targets, vec![TargetId(0), TargetId(2)]);
    }

    #[test_log::test]
    fn test_identical_detection_merges_labels() {
        let library = library();
        let mut candidates = vec![
            candidate(0, 105.0, 301.007, 1000.0, 5.0, "A"),
            candidate(1, 105.0, 301.007, 1000.0, 5.0, "B"),
        ];
        let bounds = vec![boxed(105.0, 301.007), boxed(105.0, 301.007)];
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);

        assert_eq!((summary.n_merged, summary.n_undecided), (1, 0));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].meta.label, "A/B");
        assert_eq!(candidates[0].meta.alt_targets, vec![TargetId(1)]);
        assert_eq!(candidates[0].meta.overlap_removed.len(), 1);
    }

    #[test_log::test]
    fn test_equally_good_different_detections() {
        let library = library();
        // same |rt_deviation| and intensity, but not the same detection
        let mut candidates = vec![
            candidate(0, 104.0, 301.007, 1000.0, -4.0, "A"),
            candidate(1, 106.0, 301.007, 1000.0, 4.0, "B"),
        ];
        let bounds = vec![boxed(104.0, 301.007), boxed(106.0, 301.007)];
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);

        assert_eq!((summary.n_merged, summary.n_undecided), (0, 1));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, TargetId(0));
        assert_eq!(candidates[0].meta.label, "A");
        assert!(candidates[0].meta.alt_targets.is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let library = library();
        let mut candidates = vec![
            candidate(0, 102.0, 301.007, 1000.0, -2.0, "A"),
            candidate(1, 103.0, 301.007, 1000.0, 7.0, "B"),
            candidate(2, 105.0, 501.007, 500.0, 0.0, "C"),
        ];
        let bounds = vec![boxed(102.0, 301.007), boxed(103.0, 301.007), boxed(105.0, 501.007)];
        resolve_overlaps(&mut candidates, &bounds, &library);
        let first = candidates.clone();

        let bounds: Vec<Vec<MassTraceBounds>> = candidates.iter().map(|c| boxed(c.rt, c.mz)).collect();
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);
        assert_eq!(summary, OverlapSummary::default());
        assert_eq!(candidates, first);
    }

    #[test]
    fn test_empty_bounds_never_overlap() {
        let library = library();
        let mut candidates = vec![
            candidate(0, 100.0, 301.007, 1000.0, 0.0, "A"),
            candidate(1, 100.0, 301.007, 2000.0, 0.0, "B"),
        ];
        let bounds = vec![boxed(100.0, 301.007), Vec::new()];
        let summary = resolve_overlaps(&mut candidates, &bounds, &library);
        assert_eq!(summary.n_groups, 0);
        assert_eq!(candidates.len(), 2);
    }
}
