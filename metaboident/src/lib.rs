// src/lib.rs
pub mod error;
pub mod params;
pub mod finder;

pub mod assay {
    pub mod target;
    pub mod library;
    pub mod table;
}

pub mod detection {
    pub mod candidate;
    pub mod detector;
    pub mod io;
}

pub mod resolve {
    pub mod select;
    pub mod bounds;
    pub mod overlap;
    pub mod annotate;
}
