use crate::chemistry::constants::{C13C12_MASS_DIFF, MASS_PROTON};

/// calculate the m/z of an ion
///
/// Arguments:
///
/// * `monoisotopic_mass` - monoisotopic mass of the neutral molecule
/// * `charge` - charge state of the ion, negative for anions
///
/// Returns:
///
/// * `mz` - mass-over-charge of the ion
///
/// # Examples
///
/// ```
/// use mscore::chemistry::formulas::calculate_mz;
///
/// let mz = calculate_mz(1000.0, 2);
/// assert_eq!(mz, 501.007276466621);
/// let mz = calculate_mz(1000.0, -1);
/// assert!((mz - 998.992723533379).abs() < 1e-9);
/// ```
pub fn calculate_mz(monoisotopic_mass: f64, charge: i32) -> f64 {
    (monoisotopic_mass + charge as f64 * MASS_PROTON) / (charge as f64).abs()
}

/// calculate the m/z of an isotope peak of an ion
///
/// Arguments:
///
/// * `mz` - m/z of the monoisotopic ion
/// * `isotope` - nominal isotope number (0 = monoisotopic)
/// * `charge` - charge state of the ion
///
/// # Examples
///
/// ```
/// use mscore::chemistry::formulas::isotope_mz;
///
/// let mz = isotope_mz(500.0, 2, 2);
/// assert!((mz - 501.0033548378).abs() < 1e-9);
/// ```
pub fn isotope_mz(mz: f64, isotope: usize, charge: i32) -> f64 {
    mz + (C13C12_MASS_DIFF * isotope as f64 / charge as f64).abs()
}
