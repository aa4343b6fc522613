//! Reader for tab-separated target lists.
//!
//! ```text
//! Name	Formula	Mass	Charge	RT	RT_range	Iso_distrib
//! Glucose	C6H12O6	0	1	300	60	0
//! ```
//! List-valued columns (charges, RTs, RT ranges, isotope abundances) are comma separated.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::assay::target::TargetSpec;
use crate::error::{FinderError, Result};

pub const TARGET_TABLE_HEADER: &str = "Name\tFormula\tMass\tCharge\tRT\tRT_range\tIso_distrib";

pub fn read_targets<P: AsRef<Path>>(path: P) -> Result<Vec<TargetSpec>> {
    let reader = BufReader::new(File::open(path)?);
    parse_targets(reader)
}

pub fn parse_targets<R: BufRead>(reader: R) -> Result<Vec<TargetSpec>> {
    let mut lines = reader.lines();
    let header = lines.next().transpose()?.unwrap_or_default();
    if !header.starts_with(TARGET_TABLE_HEADER) {
        return Err(FinderError::Parse {
            line: 1,
            message: format!("expected header line starting with: '{}'", TARGET_TABLE_HEADER),
        });
    }

    let mut targets = Vec::new();
    let mut names = HashSet::new();

    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_number = i + 2;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let field = |k: usize| fields.get(k).copied().unwrap_or("");

        let name = field(0);
        if name.is_empty() {
            log::error!("Error: Empty name field in input line {} - skipping this line.", line_number);
            continue;
        }
        if !names.insert(name.to_string()) {
            log::error!("Error: Duplicate name '{}' in input line {} - skipping this line.", name, line_number);
            continue;
        }

        let mass = if field(2).is_empty() {
            0.0
        } else {
            parse_value::<f64>(field(2), line_number)?
        };

        targets.push(TargetSpec {
            name: name.to_string(),
            formula: field(1).to_string(),
            mass,
            charges: parse_list(field(3), line_number)?,
            rts: parse_list(field(4), line_number)?,
            rt_ranges: parse_list(field(5), line_number)?,
            iso_distribution: parse_list(field(6), line_number)?,
        });
    }

    Ok(targets)
}

fn parse_value<T: FromStr>(value: &str, line: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| FinderError::Parse {
        line,
        message: format!("cannot parse '{}': {}", value, e),
    })
}

fn parse_list<T: FromStr>(value: &str, line: usize) -> Result<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_value(v, line))
        .collect()
}
