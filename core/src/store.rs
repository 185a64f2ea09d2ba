//! Table stores.
//!
//! A [`Store`] holds any number of [`Table`]s, keyed by the name of the simulation their rows
//! were taken from. A table must be initialized before rows can be added to it, and the header
//! of an existing table is never replaced.
//!
//! Stores are read and written in a plain text format, see [`text`]. A store is not designed
//! for concurrent access: callers must ensure there is at most one writer at a time.

use std::fmt;

use indexmap::IndexMap;

use crate::{grid::GridError, Header, Table};

pub mod io;
pub use io::{
    read_store, read_store_from_path, read_store_from_path_or_default, write_store,
    write_store_to_path,
};

pub mod text;

/// A collection of tables keyed by simulation name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Store {
    tables: IndexMap<String, Table>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty table for the simulation named in the header.
    pub fn initialize(&mut self, header: Header) -> Result<&mut Table, StoreError> {
        let table = Table::new(header).map_err(StoreError::Grid)?;

        self.insert(table)
    }

    /// Inserts a table under the simulation named in its header.
    pub fn insert(&mut self, table: Table) -> Result<&mut Table, StoreError> {
        let simulation = table.header().simulation().to_string();

        match self.tables.entry(simulation) {
            indexmap::map::Entry::Occupied(entry) => {
                Err(StoreError::TableExists(entry.key().clone()))
            }
            indexmap::map::Entry::Vacant(entry) => Ok(entry.insert(table)),
        }
    }

    /// Returns `true` if the store has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns the simulation names of all tables, in insertion order.
    pub fn simulations(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the table of a simulation.
    pub fn table(&self, simulation: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(simulation)
            .ok_or_else(|| StoreError::TableNotFound(simulation.to_string()))
    }

    /// Returns the table of a simulation mutably.
    pub fn table_mut(&mut self, simulation: &str) -> Result<&mut Table, StoreError> {
        self.tables
            .get_mut(simulation)
            .ok_or_else(|| StoreError::TableNotFound(simulation.to_string()))
    }

    /// Returns an iterator over all tables, in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

/// An error associated with accessing tables in a store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreError {
    /// No table exists for the simulation.
    TableNotFound(String),
    /// A table already exists for the simulation.
    TableExists(String),
    /// The header does not describe a valid reference grid.
    Grid(GridError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TableNotFound(simulation) => {
                write!(f, "no table found for simulation '{simulation}'")
            }
            StoreError::TableExists(simulation) => {
                write!(f, "a table already exists for simulation '{simulation}'")
            }
            StoreError::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize() {
        let mut store = Store::new();

        let table = store
            .initialize(Header::new("sim", "4096", 4.0, 1.0))
            .unwrap();
        assert!(table.is_empty());

        assert_eq!(store.simulations().collect::<Vec<_>>(), vec!["sim"]);
        assert_eq!(store.table("sim").unwrap().grid().as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_initialize_existing() {
        let mut store = Store::new();
        store
            .initialize(Header::new("sim", "4096", 4.0, 1.0))
            .unwrap();

        assert_eq!(
            store
                .initialize(Header::new("sim", "2048", 2.0, 1.0))
                .unwrap_err(),
            StoreError::TableExists(String::from("sim"))
        );
        assert_eq!(store.table("sim").unwrap().header().snapshot(), "4096");
    }

    #[test]
    fn test_initialize_invalid_grid() {
        let mut store = Store::new();

        assert!(matches!(
            store.initialize(Header::new("sim", "4096", 4.0, -1.0)),
            Err(StoreError::Grid(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_table_not_found() {
        let mut store = Store::new();

        assert_eq!(
            store.table("sim").unwrap_err(),
            StoreError::TableNotFound(String::from("sim"))
        );
        assert!(store.table_mut("sim").is_err());
    }
}
