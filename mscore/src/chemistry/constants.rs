// Purpose: To store constants that are used in the program
pub const MASS_PROTON: f64 = 1.007276466621; // Unified atomic mass unit

// Mass difference between 13C and 12C, spacing of isotope peaks in a coarse pattern
pub const C13C12_MASS_DIFF: f64 = 1.0033548378; // Unified atomic mass unit
