//! Assay library construction.
//!
//! Every target is expanded into one assay per (charge, expected RT) pair. Each assay
//! gets an RT window and one transition per retained isotope of the target.

use mscore::algorithm::isotope::IsotopeDistribution;
use mscore::chemistry::formulas::{calculate_mz, isotope_mz};
use mscore::chemistry::sum_formula::SumFormula;
use serde::{Deserialize, Serialize};

use crate::assay::target::{TargetId, TargetInfo, TargetSpec, Transition};
use crate::params::FinderParams;

/// Why (part of) a target did not make it into the library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDiagnostic {
    pub name: String,
    pub reason: String,
}

/// Assays and transitions for all accepted targets. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssayLibrary {
    targets: Vec<TargetInfo>,
    transitions: Vec<Transition>,
}

impl AssayLibrary {
    pub fn targets(&self) -> &[TargetInfo] {
        &self.targets
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Panics if the id was not issued by this library.
    pub fn target(&self, id: TargetId) -> &TargetInfo {
        &self.targets[id.0]
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetInfo> {
        self.targets.get(id.0)
    }

    pub fn transitions_for(&self, id: TargetId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.target == id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

pub struct AssayLibraryBuilder {
    rt_window: f64,
    n_isotopes: usize,
    isotope_pmin: f64,
    library: AssayLibrary,
    diagnostics: Vec<TargetDiagnostic>,
}

impl AssayLibraryBuilder {
    pub fn new(params: &FinderParams) -> Self {
        AssayLibraryBuilder {
            rt_window: params.effective_rt_window(),
            n_isotopes: params.effective_n_isotopes(),
            isotope_pmin: params.isotope_pmin,
            library: AssayLibrary::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Add a target to the library.
    ///
    /// Returns the ids of the assays created for it; an empty list means the target
    /// was skipped and a diagnostic was recorded.
    pub fn add_target(&mut self, spec: &TargetSpec) -> Vec<TargetId> {
        if spec.mass <= 0.0 && spec.formula.is_empty() {
            self.skip(&spec.name, "no mass or sum formula given".to_string());
            return Vec::new();
        }
        if spec.rts.is_empty() {
            self.skip(&spec.name, "no retention time (RT) given".to_string());
            return Vec::new();
        }
        let rt_ranges = match broadcast_rt_ranges(&spec.rt_ranges, spec.rts.len()) {
            Some(ranges) => ranges,
            None => {
                self.skip(
                    &spec.name,
                    format!("{} RT ranges given for {} RTs", spec.rt_ranges.len(), spec.rts.len()),
                );
                return Vec::new();
            }
        };

        let formula = if spec.formula.is_empty() {
            None
        } else {
            match SumFormula::new(&spec.formula) {
                Ok(f) => Some(f),
                Err(e) => {
                    self.skip(&spec.name, format!("invalid sum formula '{}': {}", spec.formula, e));
                    return Vec::new();
                }
            }
        };

        let mass_given = spec.mass > 0.0;
        let mass = match (&formula, mass_given) {
            (Some(f), false) => f.monoisotopic_weight(),
            _ => spec.mass,
        };

        let iso_dist = self.isotope_distribution(spec, formula.as_ref(), mass);
        if iso_dist.is_empty() {
            self.skip(&spec.name, "no isotope left above the minimum probability".to_string());
            return Vec::new();
        }

        let mut ids = Vec::new();
        for &charge in &spec.charges {
            if charge == 0 {
                log::error!("Error: Invalid charge 0 for target '{}' - skipping this charge.", spec.name);
                self.diagnostics.push(TargetDiagnostic {
                    name: spec.name.clone(),
                    reason: "invalid charge 0".to_string(),
                });
                continue;
            }

            let mz = match (&formula, mass_given) {
                (Some(f), false) => f.mz(charge),
                _ => calculate_mz(mass, charge),
            };

            for (&rt, &rt_range) in spec.rts.iter().zip(rt_ranges.iter()) {
                let mut rt_tol = rt_range / 2.0;
                if rt_tol == 0.0 {
                    rt_tol = self.rt_window / 2.0;
                }

                let id = TargetId(self.library.targets.len());
                self.library.targets.push(TargetInfo {
                    id,
                    name: spec.name.clone(),
                    formula: spec.formula.clone(),
                    mass,
                    charge,
                    mz,
                    expected_rt: rt,
                    rt_min: rt - rt_tol,
                    rt_max: rt + rt_tol,
                });
                self.add_transitions(id, mz, charge, &iso_dist);
                ids.push(id);
            }
        }

        if ids.is_empty() {
            self.skip(&spec.name, "no valid charge state given".to_string());
        }
        ids
    }

    pub fn add_targets<'a, I>(&mut self, specs: I)
    where
        I: IntoIterator<Item = &'a TargetSpec>,
    {
        for spec in specs {
            self.add_target(spec);
        }
    }

    pub fn diagnostics(&self) -> &[TargetDiagnostic] {
        &self.diagnostics
    }

    pub fn build(self) -> (AssayLibrary, Vec<TargetDiagnostic>) {
        (self.library, self.diagnostics)
    }

    fn skip(&mut self, name: &str, reason: String) {
        log::error!("Error: {} for target '{}' - skipping this target.", reason, name);
        self.diagnostics.push(TargetDiagnostic { name: name.to_string(), reason });
    }

    /// Explicit abundances win over the formula, the formula over the mass-only estimate.
    fn isotope_distribution(
        &self,
        spec: &TargetSpec,
        formula: Option<&SumFormula>,
        mass: f64,
    ) -> IsotopeDistribution {
        let explicit = &spec.iso_distribution;
        let mut iso_dist = if explicit.first().is_some_and(|&a| a != 0.0) {
            let n = self.n_isotopes.min(explicit.len());
            IsotopeDistribution::from_abundances(&explicit[..n])
        } else if let Some(f) = formula {
            f.isotope_distribution(self.n_isotopes)
        } else {
            log::error!(
                "Error: No sum formula given for target '{}'; cannot calculate isotope distribution - using estimation method for peptides.",
                spec.name
            );
            IsotopeDistribution::from_peptide_weight(mass, self.n_isotopes)
        };

        if self.isotope_pmin > 0.0 {
            iso_dist.trim_left(self.isotope_pmin);
            iso_dist.trim_right(self.isotope_pmin);
        }
        iso_dist.renormalize();
        iso_dist
    }

    fn add_transitions(&mut self, id: TargetId, mz: f64, charge: i32, iso_dist: &IsotopeDistribution) {
        for peak in &iso_dist.peaks {
            self.library.transitions.push(Transition {
                target: id,
                isotope: peak.index,
                precursor_mz: mz,
                product_mz: isotope_mz(mz, peak.index, charge),
                library_intensity: peak.abundance,
            });
        }
    }
}

/// One RT range per RT: none given means 0 (default window), a single one is reused.
fn broadcast_rt_ranges(rt_ranges: &[f64], n_rts: usize) -> Option<Vec<f64>> {
    match rt_ranges.len() {
        0 => Some(vec![0.0; n_rts]),
        1 => Some(vec![rt_ranges[0]; n_rts]),
        n if n == n_rts => Some(rt_ranges.to_vec()),
        _ => None,
    }
}
