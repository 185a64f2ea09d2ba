#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Tools for building tables of halo property time series.
//!
//! This serves as the core library implementation for the `halodb` CLI, but can also be used as
//! a free-standing library.
//!
//! # Overview
//!
//! Properties of simulated halos are looked up in a [`SimulationDatabase`], such as a
//! [`Catalog`], as series sampled at irregular times. Each series is aligned onto the reference
//! [`Grid`] of a [`Table`] by assigning samples to their nearest grid point (see [`align()`]). A
//! [`Store`] holds one table per simulation, each with a [`Header`] from which the grid can be
//! reconstructed.
//!
//! # Example
//!
//! ```
//! use halodb_core::{Grid, align::{align, MISSING}};
//!
//! let grid = Grid::new(1.0, 4.0).unwrap();
//! assert_eq!(grid.as_slice(), &[1.0, 2.0, 3.0]);
//!
//! let row = align(&[10.0, 20.0], &grid, &[1.1, 2.9], MISSING).unwrap();
//! assert_eq!(row[0], 10.0);
//! assert!(row[1].is_nan());
//! assert_eq!(row[2], 20.0);
//! ```

#[cfg(test)]
#[macro_use]
pub(crate) mod approx;

pub mod align;
pub use align::align;

pub mod catalog;
pub use catalog::{Catalog, SimulationDatabase};

pub mod grid;
pub use grid::Grid;

pub mod halo;
pub use halo::HaloNumber;

pub mod header;
pub use header::Header;

pub mod input;
pub use input::Input;

pub mod source;
pub use source::{Mode, PropertySource};

pub mod store;
pub use store::Store;

pub mod table;
pub use table::{Key, Policy, Table};
