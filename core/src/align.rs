//! Alignment of irregularly sampled series onto a reference grid.

use std::fmt;

use crate::Grid;

/// The default value used for grid points without a sample.
pub const MISSING: f64 = f64::NAN;

/// Aligns a series sampled at `times` onto `grid`.
///
/// Each sample is assigned to the grid point nearest to its sample time, with ties going to the
/// lowest index. Samples are processed in order, so when several samples share the same nearest
/// grid point, the last one is kept. Grid points that receive no sample are set to `missing`.
///
/// The returned row always has the same length as the grid. The series and sample times must
/// have the same length.
pub fn align(
    series: &[f64],
    grid: &Grid,
    times: &[f64],
    missing: f64,
) -> Result<Vec<f64>, AlignError> {
    if series.len() != times.len() {
        return Err(AlignError::LengthMismatch {
            series: series.len(),
            times: times.len(),
        });
    }

    let mut row = vec![missing; grid.len()];

    for (&value, &t) in series.iter().zip(times) {
        if let Some(i) = grid.nearest_index(t) {
            row[i] = value;
        }
    }

    Ok(row)
}

/// An error associated with aligning a series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlignError {
    /// The series and its sample times differ in length.
    LengthMismatch {
        /// Length of the series.
        series: usize,
        /// Number of sample times.
        times: usize,
    },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::LengthMismatch { series, times } => write!(
                f,
                "cannot align series of length {series} using {times} sample times"
            ),
        }
    }
}

impl std::error::Error for AlignError {}
