//! Targeted feature finding run.
//!
//! ```text
//! targets -> assay library -> detector -> annotate -> select best per assay
//!         -> trace bounds -> resolve overlaps -> features + unassigned targets
//! ```

use std::path::Path;

use crate::assay::library::{AssayLibrary, AssayLibraryBuilder, TargetDiagnostic};
use crate::assay::table::read_targets;
use crate::assay::target::TargetSpec;
use crate::detection::candidate::{sort_by_target_and_rt, CandidateDetection};
use crate::detection::detector::CandidateDetector;
use crate::detection::io::save_candidates_json;
use crate::error::Result;
use crate::params::FinderParams;
use crate::resolve::annotate::{
    add_target_annotations, annotate_candidates, extract_rt_transformation, RtTransformationPoint,
    UnassignedTarget,
};
use crate::resolve::bounds::compute_feature_bounds;
use crate::resolve::overlap::resolve_overlaps;
use crate::resolve::select::select_best_candidates;

#[derive(Clone, Debug)]
pub struct FinderResult {
    pub library: AssayLibrary,
    /// Final features, sorted by target and RT
    pub features: Vec<CandidateDetection>,
    pub unassigned: Vec<UnassignedTarget>,
    /// Features that explain more than one target
    pub n_shared: usize,
    pub rt_transformation: Vec<RtTransformationPoint>,
    pub diagnostics: Vec<TargetDiagnostic>,
}

pub struct FeatureFinder {
    params: FinderParams,
    builder: AssayLibraryBuilder,
}

impl FeatureFinder {
    pub fn new(params: FinderParams) -> Result<Self> {
        params.validate()?;
        let builder = AssayLibraryBuilder::new(&params);
        Ok(FeatureFinder { params, builder })
    }

    pub fn params(&self) -> &FinderParams {
        &self.params
    }

    pub fn add_targets(&mut self, specs: &[TargetSpec]) {
        self.builder.add_targets(specs);
    }

    /// Read a tab-separated target list and add its targets.
    pub fn add_targets_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let specs = read_targets(path)?;
        self.add_targets(&specs);
        Ok(specs.len())
    }

    pub fn run<D: CandidateDetector + ?Sized>(self, detector: &D) -> Result<FinderResult> {
        let FeatureFinder { params, builder } = self;
        let (library, diagnostics) = builder.build();
        log::info!(
            "Assay library: {} assays with {} transitions ({} targets skipped or incomplete).",
            library.len(),
            library.transitions().len(),
            diagnostics.len()
        );

        let mut candidates = detector.detect(&library, &params.detection_params())?;
        log::info!("Detector returned {} feature candidates.", candidates.len());

        annotate_candidates(&mut candidates, &library, &params)?;
        sort_by_target_and_rt(&mut candidates);

        if let Some(path) = &params.candidates_out {
            save_candidates_json(path, &candidates)?;
            log::info!("Wrote {} feature candidates to {}.", candidates.len(), path.display());
        }

        let selection = select_best_candidates(&mut candidates, &library, params.effective_rt_window())?;
        log::info!(
            "{} features left after selecting the best candidate per assay ({} removed, {} assays ambiguous).",
            candidates.len(),
            selection.n_removed,
            selection.n_ambiguous
        );

        let bounds = compute_feature_bounds(&candidates, &library)?;
        resolve_overlaps(&mut candidates, &bounds, &library);
        sort_by_target_and_rt(&mut candidates);

        if candidates.is_empty() {
            log::warn!("Warning: No features left after filtering.");
        }

        let (unassigned, n_shared) = add_target_annotations(&candidates, &library);
        let rt_transformation = extract_rt_transformation(&candidates, &library);
        log::info!(
            "{} features, {} assays without feature, {} features shared between targets.",
            candidates.len(),
            unassigned.len(),
            n_shared
        );

        Ok(FinderResult {
            library,
            features: candidates,
            unassigned,
            n_shared,
            rt_transformation,
            diagnostics,
        })
    }
}
