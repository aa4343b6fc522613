use std::io::Write;

use metaboident::assay::library::AssayLibrary;
use metaboident::assay::table::TARGET_TABLE_HEADER;
use metaboident::assay::target::TargetId;
use metaboident::detection::candidate::{CandidateDetection, MassTrace};
use metaboident::detection::detector::CandidateDetector;
use metaboident::error::Result;
use metaboident::finder::FeatureFinder;
use metaboident::params::{DetectionParams, FinderParams};

/// Chromatographic peaks of a simulated sample.
struct SimulatedSample {
    peaks: Vec<(f64, f64, f64)>,
}

impl CandidateDetector for SimulatedSample {
    fn detect(&self, library: &AssayLibrary, params: &DetectionParams) -> Result<Vec<CandidateDetection>> {
        let mut candidates = Vec::new();
        for target in library.targets() {
            let tol = if params.mz_window_ppm {
                target.mz * params.mz_window / 2.0 * 1.0e-6
            } else {
                params.mz_window / 2.0
            };
            for &(mz, apex, intensity) in &self.peaks {
                if (mz - target.mz).abs() > tol {
                    continue;
                }
                let mut candidate = CandidateDetection::new(target.id, apex, mz, intensity, apex - 8.0, apex + 8.0);
                for transition in library.transitions_for(target.id) {
                    let height = intensity * transition.library_intensity;
                    candidate = candidate.with_trace(
                        MassTrace::new(transition.isotope, transition.product_mz, height).with_elution_profile(vec![
                            (apex - 8.0, 0.0),
                            (apex - 5.0, height / 4.0),
                            (apex, height),
                            (apex + 5.0, height / 4.0),
                            (apex + 8.0, 0.0),
                        ]),
                    );
                }
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }
}

fn finder_for(rows: &[&str]) -> FeatureFinder {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", TARGET_TABLE_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();

    let params = FinderParams { rt_window: 60.0, ..Default::default() };
    let mut finder = FeatureFinder::new(params).unwrap();
    finder.add_targets_from_file(file.path()).unwrap();
    finder
}

#[test_log::test]
fn test_pipeline_resolves_isobaric_targets() {
    let finder = finder_for(&[
        "A\t\t300\t1\t100\t\t",
        "B\t\t300\t1\t110\t\t",
        "nothing\t\t\t1\t50\t\t",
        "Glucose\tC6H12O6\t\t1\t300\t\t",
    ]);

    let a_mz = 300.0 + 1.007276466621;
    let glucose_mz = 181.070665;
    let sample = SimulatedSample {
        peaks: vec![(a_mz, 102.0, 1000.0), (glucose_mz, 240.0, 5000.0), (glucose_mz, 295.0, 2000.0)],
    };
    let result = finder.run(&sample).unwrap();

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].name, "nothing");
    assert_eq!(result.library.len(), 3);

    let kept: Vec<(TargetId, f64)> = result.features.iter().map(|f| (f.target, f.rt)).collect();
    assert_eq!(kept, vec![(TargetId(0), 102.0), (TargetId(2), 295.0)]);

    let a = &result.features[0];
    assert_eq!(a.meta.label, "A");
    assert_eq!(a.meta.rt_deviation, Some(-2.0));
    assert_eq!(a.meta.overlap_removed, vec!["B_m300_z1_rt110 (RT 102)".to_string()]);
    assert!(a.traces.iter().all(|t| t.isotope_probability.is_some() && t.mz_extent.len() == 2));

    assert_eq!(result.unassigned.len(), 1);
    assert_eq!(result.unassigned[0].label, "B");
    assert_eq!(result.n_shared, 0);
    assert_eq!(result.rt_transformation.len(), 2);
}

#[test]
fn test_pipeline_merges_identical_detections() {
    let finder = finder_for(&["A\t\t300\t1\t100\t\t", "A_isomer\t\t300\t1\t100\t\t"]);
    let sample = SimulatedSample { peaks: vec![(301.007276466621, 104.0, 1000.0)] };
    let result = finder.run(&sample).unwrap();

    assert_eq!(result.features.len(), 1);
    assert_eq!(result.features[0].meta.label, "A/A_isomer");
    assert_eq!(result.features[0].meta.alt_targets, vec![TargetId(1)]);
    assert!(result.unassigned.is_empty());
    assert_eq!(result.n_shared, 1);
}

#[test]
fn test_pipeline_is_stable_on_rerun() {
    let rows = ["A\t\t300\t1\t100\t\t", "B\t\t300\t1\t110\t\t"];
    let sample = SimulatedSample { peaks: vec![(301.007276466621, 102.0, 1000.0), (301.007276466621, 180.0, 800.0)] };

    let first = finder_for(&rows).run(&sample).unwrap();
    let second = finder_for(&rows).run(&sample).unwrap();
    assert_eq!(first.features, second.features);
}
