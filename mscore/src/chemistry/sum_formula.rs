use std::collections::HashMap;

use regex::Regex;

use crate::algorithm::isotope::IsotopeDistribution;
use crate::chemistry::constants::MASS_PROTON;
use crate::chemistry::elements::atomic_weights_mono_isotopic;

#[derive(Clone, Debug, PartialEq)]
pub struct SumFormula {
    pub formula: String,
    pub elements: HashMap<String, i32>,
}

impl SumFormula {
    /// Parse a sum formula such as `C6H12O6`.
    ///
    /// # Example
    ///
    /// ```
    /// use mscore::chemistry::sum_formula::SumFormula;
    ///
    /// let sum_formula = SumFormula::new("H2O").unwrap();
    /// assert_eq!(sum_formula.elements.get("H"), Some(&2));
    /// assert!(SumFormula::new("H2Xy").is_err());
    /// ```
    pub fn new(formula: &str) -> Result<Self, String> {
        let elements = parse_formula(formula)?;
        Ok(SumFormula {
            formula: formula.to_string(),
            elements,
        })
    }

    /// Calculate the monoisotopic weight of the neutral molecule.
    ///
    /// # Example
    ///
    /// ```
    /// use mscore::chemistry::sum_formula::SumFormula;
    ///
    /// let sum_formula = SumFormula::new("C6H12O6").unwrap();
    /// let weight = (sum_formula.monoisotopic_weight() * 1e5).round() / 1e5;
    /// assert_eq!(weight, 180.06339);
    /// ```
    pub fn monoisotopic_weight(&self) -> f64 {
        let atomic_weights = atomic_weights_mono_isotopic();
        self.elements.iter().fold(0.0, |acc, (element, count)| {
            acc + atomic_weights[element.as_str()] * *count as f64
        })
    }

    /// Monoisotopic weight of the ion carrying `charge` protons (negative: removed protons).
    pub fn charged_weight(&self, charge: i32) -> f64 {
        self.monoisotopic_weight() + charge as f64 * MASS_PROTON
    }

    /// Mass-to-charge ratio of the monoisotopic ion at the given charge; the sign of
    /// the charge only affects the proton accounting.
    ///
    /// # Example
    ///
    /// ```
    /// use mscore::chemistry::sum_formula::SumFormula;
    ///
    /// let glucose = SumFormula::new("C6H12O6").unwrap();
    /// let positive = (glucose.mz(1) * 1e5).round() / 1e5;
    /// let negative = (glucose.mz(-1) * 1e5).round() / 1e5;
    /// assert_eq!(positive, 181.07066);
    /// assert_eq!(negative, 179.05611);
    /// ```
    pub fn mz(&self, charge: i32) -> f64 {
        (self.charged_weight(charge) / charge as f64).abs()
    }

    /// Coarse isotope distribution of the molecule with at most `max_isotopes` peaks.
    pub fn isotope_distribution(&self, max_isotopes: usize) -> IsotopeDistribution {
        // elements were validated while parsing
        IsotopeDistribution::from_composition(&self.elements, max_isotopes).unwrap_or_default()
    }
}

/// Parse a chemical formula into a map of elements and their counts.
///
/// Arguments:
///
/// * `formula` - The chemical formula to parse.
///
/// Returns:
///
/// * `Result<HashMap<String, i32>, String>` - A map of elements and their counts.
///
/// # Example
///
/// ```
/// use mscore::chemistry::sum_formula::parse_formula;
///
/// let elements = parse_formula("CH3COOH").unwrap();
/// assert_eq!(elements.get("C"), Some(&2));
/// assert_eq!(elements.get("H"), Some(&4));
/// assert_eq!(elements.get("O"), Some(&2));
/// ```
pub fn parse_formula(formula: &str) -> Result<HashMap<String, i32>, String> {
    let atomic_weights = atomic_weights_mono_isotopic();
    let pattern = Regex::new(r"([A-Z][a-z]?)(\d*)").map_err(|e| e.to_string())?;
    let mut element_counts = HashMap::new();
    let mut consumed = 0;

    for caps in pattern.captures_iter(formula) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole.start != consumed {
            return Err(format!("Invalid sum formula: {}", formula));
        }
        consumed = whole.end;

        let element = &caps[1];
        if !atomic_weights.contains_key(element) {
            return Err(format!("Unknown element: {}", element));
        }
        let count = if caps[2].is_empty() {
            1
        } else {
            caps[2].parse::<i32>().map_err(|e| format!("Invalid count for {}: {}", element, e))?
        };
        *element_counts.entry(element.to_string()).or_insert(0) += count;
    }

    if consumed != formula.len() || element_counts.is_empty() {
        return Err(format!("Invalid sum formula: {}", formula));
    }

    Ok(element_counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_formula("").is_err());
        assert!(parse_formula("c6h12").is_err());
        assert!(parse_formula("C6 H12").is_err());
    }

    #[test]
    fn test_two_letter_elements() {
        let elements = parse_formula("NaCl").unwrap();
        assert_eq!(elements.get("Na"), Some(&1));
        assert_eq!(elements.get("Cl"), Some(&1));
    }

    #[test]
    fn test_charge_two() {
        let glucose = SumFormula::new("C6H12O6").unwrap();
        let expected = (glucose.monoisotopic_weight() + 2.0 * MASS_PROTON) / 2.0;
        assert!((glucose.mz(2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_isotope_distribution_length() {
        let caffeine = SumFormula::new("C8H10N4O2").unwrap();
        let dist = caffeine.isotope_distribution(4);
        assert_eq!(dist.len(), 4);
    }
}
