// chemistry module
pub mod chemistry {
    pub mod constants;
    pub mod elements;
    pub mod formulas;
    pub mod sum_formula;
}

// algorithm module
pub mod algorithm {
    pub mod isotope;
}
