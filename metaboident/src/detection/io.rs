//! JSON side channel for candidates before selection.
//!
//! Files carry a format version; [`load_candidates_json`] rejects other versions.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::candidate::CandidateDetection;
use crate::error::{FinderError, Result};

pub const CANDIDATE_FILE_VERSION: u32 = 1;

#[derive(Serialize)]
struct CandidateFileRef<'a> {
    version: u32,
    n_candidates: usize,
    candidates: &'a [CandidateDetection],
}

#[derive(Deserialize)]
struct CandidateFile {
    version: u32,
    candidates: Vec<CandidateDetection>,
}

pub fn save_candidates_json<P: AsRef<Path>>(path: P, candidates: &[CandidateDetection]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let file = CandidateFileRef {
        version: CANDIDATE_FILE_VERSION,
        n_candidates: candidates.len(),
        candidates,
    };
    serde_json::to_writer_pretty(writer, &file)?;
    Ok(())
}

pub fn load_candidates_json<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateDetection>> {
    let reader = BufReader::new(File::open(path)?);
    let file: CandidateFile = serde_json::from_reader(reader)?;
    if file.version != CANDIDATE_FILE_VERSION {
        return Err(FinderError::FileVersion { found: file.version, expected: CANDIDATE_FILE_VERSION });
    }
    Ok(file.candidates)
}
