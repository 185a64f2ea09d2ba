//! Property tables.
//!
//! A [`Table`] holds one row per halo and property, aligned onto the reference grid described by
//! its [`Header`]. Rows are kept in insertion order, but each key occurs at most once.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::{
    align::{self, AlignError},
    catalog::{CatalogError, SimulationDatabase, Snapshot},
    grid::GridError,
    source::PropertySource,
    Grid, HaloNumber, Header,
};

/// The key of a table row.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// Halo number.
    pub halo: HaloNumber,
    /// Property name.
    pub property: String,
}

impl Key {
    /// Creates a new key.
    pub fn new<S>(halo: HaloNumber, property: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            halo,
            property: property.into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}')", self.halo, self.property)
    }
}

/// How to handle failures when adding properties.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Policy {
    /// Skip rows that cannot be added, and add the rest.
    #[default]
    SkipAndContinue,
    /// Add nothing if any row cannot be added.
    Abort,
}

/// A table of property rows over a reference grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    header: Header,
    grid: Grid,
    rows: IndexMap<Key, Vec<f64>>,
}

impl Table {
    /// Creates an empty table, constructing the reference grid from the header.
    pub fn new(header: Header) -> Result<Self, GridError> {
        let grid = header.grid()?;

        Ok(Self {
            header,
            grid,
            rows: IndexMap::new(),
        })
    }

    /// Fetches properties of halos from a database, aligns them, and adds them as new rows.
    ///
    /// Every combination of halo and property is attempted. A combination that cannot be added
    /// is recorded as a failure in the returned report. With [`Policy::SkipAndContinue`], all
    /// other rows are still added. With [`Policy::Abort`], the first failure is returned as an
    /// error, and the table is left unchanged.
    pub fn add_properties(
        &mut self,
        database: &dyn SimulationDatabase,
        source: &dyn PropertySource,
        snapshot: &Snapshot,
        halos: &[HaloNumber],
        properties: &[String],
        policy: Policy,
    ) -> Result<AddReport, AddFailure> {
        let mut staged: IndexMap<Key, Vec<f64>> = IndexMap::new();
        let mut failures = Vec::new();

        let mut fail = |failure: AddFailure| match policy {
            Policy::SkipAndContinue => {
                failures.push(failure);
                Ok(())
            }
            Policy::Abort => Err(failure),
        };

        for &number in halos {
            let halo = match database.halo(snapshot, number) {
                Ok(halo) => halo,
                Err(error) => {
                    for property in properties {
                        fail(AddFailure::new(
                            Key::new(number, property.as_str()),
                            FailureReason::Catalog(error.clone()),
                        ))?;
                    }
                    continue;
                }
            };

            for result in source.fetch_series(database, &halo, properties) {
                let series = match result {
                    Ok(series) => series,
                    Err(e) => {
                        let key = Key::new(number, e.property);
                        fail(AddFailure::new(key, FailureReason::Catalog(e.error)))?;
                        continue;
                    }
                };

                let key = Key::new(number, series.property);

                if let Err(reason) = self.check_key(&key) {
                    fail(AddFailure::new(key, reason))?;
                    continue;
                }
                if staged.contains_key(&key) {
                    fail(AddFailure::new(key, FailureReason::DuplicateKey))?;
                    continue;
                }

                match align::align(&series.values, &self.grid, &series.times, align::MISSING) {
                    Ok(row) => {
                        staged.insert(key, row);
                    }
                    Err(e) => fail(AddFailure::new(key, FailureReason::Align(e)))?,
                }
            }
        }

        let added = staged.keys().cloned().collect();
        self.rows.extend(staged);

        Ok(AddReport { added, failures })
    }

    fn check_key(&self, key: &Key) -> Result<(), FailureReason> {
        if key.property.is_empty() || key.property.contains(['\t', '\n', '\r']) {
            Err(FailureReason::InvalidProperty)
        } else if self.rows.contains_key(key) {
            Err(FailureReason::DuplicateKey)
        } else {
            Ok(())
        }
    }

    /// Deletes all rows of the given properties.
    ///
    /// Deletion is all or nothing: if any of the properties has no rows in the table, nothing is
    /// deleted, and the missing properties are returned as an error. Otherwise, returns the number
    /// of rows deleted. The order of the remaining rows is preserved.
    pub fn delete_properties<S>(&mut self, properties: &[S]) -> Result<usize, DeleteError>
    where
        S: AsRef<str>,
    {
        let present = self.properties();
        let requested = properties
            .iter()
            .map(AsRef::as_ref)
            .collect::<IndexSet<&str>>();

        let missing = requested
            .iter()
            .filter(|property| !present.contains(**property))
            .map(|property| property.to_string())
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(DeleteError::NotFound { missing });
        }

        let before = self.rows.len();
        self.rows
            .retain(|key, _| !requested.contains(key.property.as_str()));

        Ok(before - self.rows.len())
    }

    /// Returns the row of a halo property, if present.
    pub fn get(&self, halo: HaloNumber, property: &str) -> Option<&[f64]> {
        self.rows
            .get(&Key::new(halo, property))
            .map(Vec::as_slice)
    }

    /// Returns the reference grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the distinct halo numbers in the table, in order of first appearance.
    pub fn halo_numbers(&self) -> Vec<HaloNumber> {
        self.rows
            .keys()
            .map(|key| key.halo)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the table header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Inserts a row.
    ///
    /// The row must match the length of the reference grid, and the key must not already be
    /// present.
    pub fn insert(&mut self, key: Key, row: Vec<f64>) -> Result<(), InsertError> {
        if row.len() != self.grid.len() {
            return Err(InsertError::RowLength {
                key,
                expected: self.grid.len(),
                found: row.len(),
            });
        }

        match self.check_key(&key) {
            Ok(()) => {
                self.rows.insert(key, row);
                Ok(())
            }
            Err(FailureReason::DuplicateKey) => Err(InsertError::DuplicateKey(key)),
            Err(_) => Err(InsertError::InvalidProperty(key)),
        }
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &[f64])> {
        self.rows.iter().map(|(key, row)| (key, row.as_slice()))
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns the distinct properties in the table, in order of first appearance.
    pub fn properties(&self) -> IndexSet<&str> {
        self.rows.keys().map(|key| key.property.as_str()).collect()
    }
}

/// Rows added to a table, and combinations that could not be added.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AddReport {
    /// Keys of added rows, in insertion order.
    pub added: Vec<Key>,
    /// Combinations that could not be added.
    pub failures: Vec<AddFailure>,
}

/// A halo property that could not be added to a table.
#[derive(Clone, Debug, PartialEq)]
pub struct AddFailure {
    /// The key that could not be added.
    pub key: Key,
    /// Why it could not be added.
    pub reason: FailureReason,
}

impl AddFailure {
    fn new(key: Key, reason: FailureReason) -> Self {
        Self { key, reason }
    }
}

impl fmt::Display for AddFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to add row {}: {}", self.key, self.reason)
    }
}

impl std::error::Error for AddFailure {}

/// The reason a row could not be added.
#[derive(Clone, Debug, PartialEq)]
pub enum FailureReason {
    /// The database could not provide the series.
    Catalog(CatalogError),
    /// The series could not be aligned.
    Align(AlignError),
    /// The row already exists.
    DuplicateKey,
    /// The property name cannot be stored.
    InvalidProperty,
}

impl FailureReason {
    /// Returns a short description of the kind of failure.
    pub fn reason(&self) -> &'static str {
        match self {
            FailureReason::Catalog(e) => e.reason(),
            FailureReason::Align(_) => "series length mismatch",
            FailureReason::DuplicateKey => "row already exists",
            FailureReason::InvalidProperty => "invalid property name",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Catalog(e) => write!(f, "{e}"),
            FailureReason::Align(e) => write!(f, "{e}"),
            FailureReason::DuplicateKey => f.write_str("row already exists"),
            FailureReason::InvalidProperty => {
                f.write_str("property names must be non-empty and contain no tabs or newlines")
            }
        }
    }
}

/// An error associated with inserting a row.
#[derive(Clone, Debug, PartialEq)]
pub enum InsertError {
    /// The row already exists.
    DuplicateKey(Key),
    /// The property name cannot be stored.
    InvalidProperty(Key),
    /// The row does not match the length of the reference grid.
    RowLength {
        /// Row key.
        key: Key,
        /// Length of the reference grid.
        expected: usize,
        /// Length of the row.
        found: usize,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey(key) => write!(f, "duplicate row {key}"),
            InsertError::InvalidProperty(key) => write!(f, "invalid property name in row {key}"),
            InsertError::RowLength {
                key,
                expected,
                found,
            } => write!(
                f,
                "row {key} has {found} values, but the time grid has {expected} points"
            ),
        }
    }
}

impl std::error::Error for InsertError {}

/// An error associated with deleting properties.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeleteError {
    /// Some properties have no rows in the table.
    NotFound {
        /// The properties not found, in the order requested.
        missing: Vec<String>,
    },
}

impl fmt::Display for DeleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteError::NotFound { missing } => {
                let missing = missing
                    .iter()
                    .map(|property| format!("'{property}'"))
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "properties not found: {missing}")
            }
        }
    }
}

impl std::error::Error for DeleteError {}
