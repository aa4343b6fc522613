use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Discrete, Poisson};

use crate::chemistry::elements::coarse_isotope_abundances;

/// One peak of a coarse isotope pattern.
///
/// `index` is the nominal isotope number (0 = monoisotopic) and stays fixed when
/// low-abundance peaks are trimmed from the pattern.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsotopePeak {
    pub index: usize,
    pub abundance: f64,
}

/// Coarse (nominal mass resolution) isotope distribution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IsotopeDistribution {
    pub peaks: Vec<IsotopePeak>,
}

impl IsotopeDistribution {
    /// Build a distribution from explicitly given relative abundances, one per isotope.
    ///
    /// # Examples
    ///
    /// ```
    /// use mscore::algorithm::isotope::IsotopeDistribution;
    ///
    /// let dist = IsotopeDistribution::from_abundances(&[0.6, 0.3, 0.1]);
    /// assert_eq!(dist.len(), 3);
    /// assert_eq!(dist.peaks[2].index, 2);
    /// ```
    pub fn from_abundances(abundances: &[f64]) -> Self {
        let peaks = abundances
            .iter()
            .enumerate()
            .map(|(index, &abundance)| IsotopePeak { index, abundance })
            .collect();
        IsotopeDistribution { peaks }
    }

    /// Coarse isotope distribution of an atomic composition, limited to the first
    /// `max_isotopes` nominal isotopes.
    ///
    /// Arguments:
    ///
    /// * `composition` - element symbol to atom count
    /// * `max_isotopes` - number of isotope peaks to compute
    ///
    /// Returns:
    ///
    /// * `Result<IsotopeDistribution, String>` - the pattern, or an error for unknown elements
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use mscore::algorithm::isotope::IsotopeDistribution;
    ///
    /// let mut composition = HashMap::new();
    /// composition.insert("C".to_string(), 1);
    /// let dist = IsotopeDistribution::from_composition(&composition, 2).unwrap();
    /// assert_eq!(dist.abundances(), vec![0.9893, 0.0107]);
    /// ```
    pub fn from_composition(composition: &HashMap<String, i32>, max_isotopes: usize) -> Result<Self, String> {
        let max_isotopes = max_isotopes.max(1);
        let mut cumulative = vec![1.0];

        // sorted for a reproducible summation order
        let mut elements: Vec<(&String, &i32)> = composition.iter().collect();
        elements.sort();

        for (element, &count) in elements {
            if count <= 0 {
                continue;
            }
            let atom = coarse_isotope_abundances(element)
                .ok_or_else(|| format!("Unknown element: {}", element))?;
            let element_distribution = convolve_pow(&atom, count as u32, max_isotopes);
            cumulative = convolve(&cumulative, &element_distribution, max_isotopes);
        }

        Ok(IsotopeDistribution::from_abundances(&cumulative))
    }

    /// Estimate a distribution from mass alone, using the averagine Poisson model for
    /// peptides.
    ///
    /// # Examples
    ///
    /// ```
    /// use mscore::algorithm::isotope::IsotopeDistribution;
    ///
    /// let dist = IsotopeDistribution::from_peptide_weight(1000.0, 3);
    /// assert_eq!(dist.len(), 3);
    /// assert!(dist.peaks[0].abundance > dist.peaks[1].abundance);
    /// ```
    pub fn from_peptide_weight(mass: f64, max_isotopes: usize) -> Self {
        let max_isotopes = max_isotopes.max(1);
        let abundances = averagine_weights(mass, max_isotopes);
        IsotopeDistribution::from_abundances(&abundances)
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn abundances(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.abundance).collect()
    }

    pub fn total_abundance(&self) -> f64 {
        self.peaks.iter().map(|p| p.abundance).sum()
    }

    /// Remove leading peaks with an abundance below `cutoff`.
    pub fn trim_left(&mut self, cutoff: f64) {
        let first_kept = self.peaks.iter().position(|p| p.abundance >= cutoff).unwrap_or(self.peaks.len());
        self.peaks.drain(..first_kept);
    }

    /// Remove trailing peaks with an abundance below `cutoff`.
    pub fn trim_right(&mut self, cutoff: f64) {
        let kept = self.peaks.iter().rposition(|p| p.abundance >= cutoff).map_or(0, |i| i + 1);
        self.peaks.truncate(kept);
    }

    /// Scale abundances so that they sum to one. A distribution without abundance is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use mscore::algorithm::isotope::IsotopeDistribution;
    ///
    /// let mut dist = IsotopeDistribution::from_abundances(&[2.0, 1.0, 1.0]);
    /// dist.renormalize();
    /// assert_eq!(dist.abundances(), vec![0.5, 0.25, 0.25]);
    /// ```
    pub fn renormalize(&mut self) {
        let total = self.total_abundance();
        if total > 0.0 {
            for peak in self.peaks.iter_mut() {
                peak.abundance /= total;
            }
        }
    }
}

/// convolve two coarse isotope distributions, keeping at most `max_isotopes` peaks
///
/// Arguments:
///
/// * `dist_a` - first distribution, indexed by nominal isotope
/// * `dist_b` - second distribution, indexed by nominal isotope
/// * `max_isotopes` - maximum number of peaks to keep
///
/// Returns:
///
/// * `Vec<f64>` - combined distribution
///
/// # Examples
///
/// ```
/// use mscore::algorithm::isotope::convolve;
///
/// let result = convolve(&vec![0.5, 0.5], &vec![0.5, 0.5], 10);
/// assert_eq!(result, vec![0.25, 0.5, 0.25]);
/// ```
pub fn convolve(dist_a: &[f64], dist_b: &[f64], max_isotopes: usize) -> Vec<f64> {
    let size = (dist_a.len() + dist_b.len()).saturating_sub(1).min(max_isotopes);
    let mut result = vec![0.0; size];

    for (i, a) in dist_a.iter().enumerate() {
        for (j, b) in dist_b.iter().enumerate() {
            if i + j >= size {
                break;
            }
            result[i + j] += a * b;
        }
    }

    result
}

/// convolve a coarse distribution with itself n times, by repeated squaring
///
/// # Examples
///
/// ```
/// use mscore::algorithm::isotope::convolve_pow;
///
/// let result = convolve_pow(&vec![0.5, 0.5], 2, 10);
/// assert_eq!(result, vec![0.25, 0.5, 0.25]);
/// ```
pub fn convolve_pow(dist: &[f64], n: u32, max_isotopes: usize) -> Vec<f64> {
    let mut result = vec![1.0];
    let mut base = dist.to_vec();
    let mut n = n;

    while n > 0 {
        if n & 1 == 1 {
            result = convolve(&result, &base, max_isotopes);
        }
        n >>= 1;
        if n > 0 {
            base = convolve(&base, &base, max_isotopes);
        }
    }

    result
}

/// calculate the lambda value of the averagine Poisson model for a given mass
///
/// # Examples
///
/// ```
/// use mscore::algorithm::isotope::lam;
///
/// let lambda = lam(1000.0, 0.000594, -0.03091);
/// assert!((lambda - 0.56309).abs() < 1e-12);
/// ```
pub fn lam(mass: f64, slope: f64, intercept: f64) -> f64 {
    slope * mass + intercept
}

/// relative isotope abundances for the first `n` isotopes of a peptide of the given mass,
/// normalized to sum to one
pub fn averagine_weights(mass: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let lam_val = lam(mass, 0.000594, -0.03091);
    let monoisotopic_only = || {
        let mut weights = vec![0.0; n];
        weights[0] = 1.0;
        weights
    };

    // very light molecules: no room for heavy isotopes in the model
    let poisson = match Poisson::new(lam_val) {
        Ok(p) if lam_val > 0.0 => p,
        _ => return monoisotopic_only(),
    };

    let weights: Vec<f64> = (0..n as u64).map(|k| poisson.pmf(k)).collect();
    let sum: f64 = weights.iter().sum();
    // for very heavy molecules the first n pmf values underflow to zero
    if !sum.is_finite() || sum <= 0.0 {
        return monoisotopic_only();
    }
    weights.iter().map(|&w| w / sum).collect()
}
