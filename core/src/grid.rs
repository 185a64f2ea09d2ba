//! Reference time grid.

use std::{fmt, ops::Deref};

/// A reference time grid.
///
/// The grid is the sequence `delta_t, 2 * delta_t, 3 * delta_t, ...` up to, but not including,
/// `current_t`. Each value is computed as a multiple of `delta_t` rather than by accumulation, so
/// that the same parameters always reconstruct the same grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid(Vec<f64>);

impl Grid {
    /// Creates a new grid from its step and its (exclusive) end point.
    ///
    /// The grid is empty if `delta_t >= current_t`.
    pub fn new(delta_t: f64, current_t: f64) -> Result<Self, GridError> {
        if !(delta_t.is_finite() && delta_t > 0.0) {
            return Err(GridError::InvalidStep(delta_t));
        }
        if !current_t.is_finite() {
            return Err(GridError::InvalidEnd(current_t));
        }

        let values = (1..)
            .map(|k| delta_t * k as f64)
            .take_while(|&t| t < current_t)
            .collect();

        Ok(Self(values))
    }

    /// Returns the grid values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the index of the grid value nearest to `t`.
    ///
    /// Ties are resolved in favour of the lowest index, and a distance that is not a number never
    /// replaces the current best, so a NaN time maps to the first index. Returns `None` if the
    /// grid is empty.
    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        self.0
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| {
                let distance = (v - t).abs();

                match best {
                    Some((_, best_distance)) if distance.is_nan() || best_distance <= distance => {
                        best
                    }
                    _ => Some((i, distance)),
                }
            })
            .map(|(i, _)| i)
    }
}

impl AsRef<[f64]> for Grid {
    fn as_ref(&self) -> &[f64] {
        self
    }
}

impl Deref for Grid {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// An error associated with constructing a grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridError {
    /// The step is not a positive, finite number.
    InvalidStep(f64),
    /// The end point is not a finite number.
    InvalidEnd(f64),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidStep(delta_t) => {
                write!(f, "time step must be positive and finite (found {delta_t})")
            }
            GridError::InvalidEnd(current_t) => {
                write!(f, "final time must be finite (found {current_t})")
            }
        }
    }
}

impl std::error::Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_unit_step() {
        let grid = Grid::new(1.0, 4.0).unwrap();

        assert_eq!(grid.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_grid_excludes_end() {
        let grid = Grid::new(0.5, 2.0).unwrap();

        assert_eq!(grid.as_slice(), &[0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_grid_non_multiple_end() {
        let grid = Grid::new(1.0, 3.5).unwrap();

        assert_eq!(grid.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_grid_strictly_less_than_end() {
        let grid = Grid::new(0.1, 0.4).unwrap();

        assert!(grid.iter().all(|&t| t < 0.4));
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_grid_empty_iff_step_not_below_end() {
        assert!(Grid::new(1.0, 1.0).unwrap().is_empty());
        assert!(Grid::new(2.0, 1.0).unwrap().is_empty());
        assert!(Grid::new(1.0, -3.0).unwrap().is_empty());
        assert!(!Grid::new(0.99, 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_grid_invalid_parameters() {
        assert_eq!(Grid::new(0.0, 4.0), Err(GridError::InvalidStep(0.0)));
        assert_eq!(Grid::new(-1.0, 4.0), Err(GridError::InvalidStep(-1.0)));
        assert!(matches!(
            Grid::new(f64::NAN, 4.0),
            Err(GridError::InvalidStep(_))
        ));
        assert_eq!(
            Grid::new(1.0, f64::INFINITY),
            Err(GridError::InvalidEnd(f64::INFINITY))
        );
    }

    #[test]
    fn test_nearest_index() {
        let grid = Grid::new(1.0, 4.0).unwrap();

        assert_eq!(grid.nearest_index(1.1), Some(0));
        assert_eq!(grid.nearest_index(2.9), Some(2));
        assert_eq!(grid.nearest_index(-10.0), Some(0));
        assert_eq!(grid.nearest_index(10.0), Some(2));
    }

    #[test]
    fn test_nearest_index_tie_resolves_to_lower() {
        let grid = Grid::new(1.0, 4.0).unwrap();

        assert_eq!(grid.nearest_index(1.5), Some(0));
        assert_eq!(grid.nearest_index(2.5), Some(1));
    }

    #[test]
    fn test_nearest_index_empty() {
        let grid = Grid::new(1.0, 1.0).unwrap();

        assert_eq!(grid.nearest_index(0.5), None);
    }

    #[test]
    fn test_nearest_index_nan_is_first() {
        let grid = Grid::new(1.0, 4.0).unwrap();

        assert_eq!(grid.nearest_index(f64::NAN), Some(0));
        assert_eq!(Grid::new(1.0, 1.0).unwrap().nearest_index(f64::NAN), None);
    }
}
