//! Simulation database access.
//!
//! Rows of a table are built from property series looked up in a simulation database. The
//! [`SimulationDatabase`] trait describes the lookups required: finding a snapshot, finding a
//! halo within it, live-calculating a property for a halo, and following a halo's progenitor
//! history. A [`Catalog`] is an in-memory implementation, usually read from a catalog file (see
//! [`read`]).

use std::fmt;

use indexmap::IndexMap;

use crate::HaloNumber;

pub mod read;

/// The name of the property holding the times along a progenitor history.
pub const TIME_PROPERTY: &str = "t()";

/// A simulation database.
pub trait SimulationDatabase {
    /// Returns the pixel time step of time-histogram properties.
    fn pixel_delta_t(&self) -> f64;

    /// Finds the first snapshot of `simulation` whose name ends with `pattern`.
    fn snapshot(&self, simulation: &str, pattern: &str) -> Result<Snapshot, CatalogError>;

    /// Finds a halo within a snapshot.
    fn halo(&self, snapshot: &Snapshot, number: HaloNumber) -> Result<Halo, CatalogError>;

    /// Live-calculates a time-histogram property for a halo.
    fn live_property(&self, halo: &Halo, property: &str) -> Result<Vec<f64>, CatalogError>;

    /// Calculates properties along the main progenitor line of a halo.
    fn progenitor_history(
        &self,
        halo: &Halo,
        properties: &[String],
    ) -> Result<History, CatalogError>;
}

/// A handle to a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    simulation: String,
    name: String,
    time: f64,
}

impl Snapshot {
    /// Returns the snapshot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the simulation name.
    pub fn simulation(&self) -> &str {
        &self.simulation
    }

    /// Returns the snapshot time.
    pub fn time(&self) -> f64 {
        self.time
    }
}

/// A handle to a halo within a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Halo {
    snapshot: Snapshot,
    number: HaloNumber,
}

impl Halo {
    /// Returns the halo number.
    pub fn number(&self) -> HaloNumber {
        self.number
    }

    /// Returns the snapshot containing the halo.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Properties along a progenitor history.
#[derive(Clone, Debug, PartialEq)]
pub struct History {
    /// The time of each step along the history.
    pub times: Vec<f64>,
    /// One series per requested property, in the order requested.
    pub series: Vec<Vec<f64>>,
}

/// An in-memory simulation database.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pixel_delta_t: f64,
    snapshots: Vec<SnapshotEntry>,
}

#[derive(Clone, Debug, PartialEq)]
struct SnapshotEntry {
    snapshot: Snapshot,
    halos: IndexMap<HaloNumber, HaloEntry>,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct HaloEntry {
    history: IndexMap<String, Vec<f64>>,
    live: IndexMap<String, Vec<f64>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kind {
    History,
    Live,
}

impl HaloEntry {
    fn properties(&self, kind: Kind) -> &IndexMap<String, Vec<f64>> {
        match kind {
            Kind::History => &self.history,
            Kind::Live => &self.live,
        }
    }
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new(pixel_delta_t: f64) -> Self {
        Self {
            pixel_delta_t,
            snapshots: Vec::new(),
        }
    }

    /// Adds a snapshot.
    pub fn add_snapshot<S, T>(
        &mut self,
        simulation: S,
        name: T,
        time: f64,
    ) -> Result<(), CatalogError>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let snapshot = Snapshot {
            simulation: simulation.into(),
            name: name.into(),
            time,
        };

        if self.find(&snapshot.simulation, &snapshot.name).is_some() {
            return Err(CatalogError::DuplicateSnapshot {
                simulation: snapshot.simulation,
                name: snapshot.name,
            });
        }

        self.snapshots.push(SnapshotEntry {
            snapshot,
            halos: IndexMap::new(),
        });

        Ok(())
    }

    /// Adds a halo to a snapshot, if not already present.
    pub fn add_halo(
        &mut self,
        simulation: &str,
        snapshot: &str,
        number: HaloNumber,
    ) -> Result<(), CatalogError> {
        self.halo_entry_mut(simulation, snapshot, number).map(|_| ())
    }

    /// Adds a progenitor history property of a halo, adding the halo if necessary.
    pub fn add_history<S>(
        &mut self,
        simulation: &str,
        snapshot: &str,
        number: HaloNumber,
        property: S,
        values: Vec<f64>,
    ) -> Result<(), CatalogError>
    where
        S: Into<String>,
    {
        self.halo_entry_mut(simulation, snapshot, number)?
            .history
            .insert(property.into(), values);

        Ok(())
    }

    /// Adds a time-histogram property of a halo, adding the halo if necessary.
    pub fn add_live<S>(
        &mut self,
        simulation: &str,
        snapshot: &str,
        number: HaloNumber,
        property: S,
        values: Vec<f64>,
    ) -> Result<(), CatalogError>
    where
        S: Into<String>,
    {
        self.halo_entry_mut(simulation, snapshot, number)?
            .live
            .insert(property.into(), values);

        Ok(())
    }

    fn find(&self, simulation: &str, name: &str) -> Option<&SnapshotEntry> {
        self.snapshots
            .iter()
            .find(|entry| entry.snapshot.simulation == simulation && entry.snapshot.name == name)
    }

    fn halo_entry(&self, halo: &Halo) -> Result<&HaloEntry, CatalogError> {
        let snapshot = &halo.snapshot;

        self.find(&snapshot.simulation, &snapshot.name)
            .and_then(|entry| entry.halos.get(&halo.number))
            .ok_or_else(|| CatalogError::HaloNotFound {
                snapshot: snapshot.name.clone(),
                halo: halo.number,
            })
    }

    fn halo_entry_mut(
        &mut self,
        simulation: &str,
        snapshot: &str,
        number: HaloNumber,
    ) -> Result<&mut HaloEntry, CatalogError> {
        self.snapshots
            .iter_mut()
            .find(|entry| {
                entry.snapshot.simulation == simulation && entry.snapshot.name == snapshot
            })
            .map(|entry| entry.halos.entry(number).or_default())
            .ok_or_else(|| CatalogError::SnapshotNotFound {
                simulation: simulation.to_string(),
                pattern: snapshot.to_string(),
            })
    }

    /// Looks up a property of a halo, distinguishing properties unknown to the simulation from
    /// properties that are merely not available for this particular halo.
    fn property(&self, halo: &Halo, property: &str, kind: Kind) -> Result<&[f64], CatalogError> {
        let entry = self.halo_entry(halo)?;

        if let Some(values) = entry.properties(kind).get(property) {
            return Ok(values);
        }

        let simulation = halo.snapshot.simulation();
        let known = self
            .snapshots
            .iter()
            .filter(|entry| entry.snapshot.simulation == simulation)
            .flat_map(|entry| entry.halos.values())
            .any(|entry| entry.properties(kind).contains_key(property));

        Err(if known {
            CatalogError::NotCalculated {
                halo: halo.number,
                property: property.to_string(),
            }
        } else {
            CatalogError::PropertyNotFound {
                property: property.to_string(),
            }
        })
    }
}

impl SimulationDatabase for Catalog {
    fn pixel_delta_t(&self) -> f64 {
        self.pixel_delta_t
    }

    fn snapshot(&self, simulation: &str, pattern: &str) -> Result<Snapshot, CatalogError> {
        self.snapshots
            .iter()
            .map(|entry| &entry.snapshot)
            .find(|snapshot| snapshot.simulation == simulation && snapshot.name.ends_with(pattern))
            .cloned()
            .ok_or_else(|| CatalogError::SnapshotNotFound {
                simulation: simulation.to_string(),
                pattern: pattern.to_string(),
            })
    }

    fn halo(&self, snapshot: &Snapshot, number: HaloNumber) -> Result<Halo, CatalogError> {
        let halo = Halo {
            snapshot: snapshot.clone(),
            number,
        };

        self.halo_entry(&halo).map(|_| halo)
    }

    fn live_property(&self, halo: &Halo, property: &str) -> Result<Vec<f64>, CatalogError> {
        self.property(halo, property, Kind::Live).map(<[f64]>::to_vec)
    }

    fn progenitor_history(
        &self,
        halo: &Halo,
        properties: &[String],
    ) -> Result<History, CatalogError> {
        let times = self.property(halo, TIME_PROPERTY, Kind::History)?.to_vec();

        let series = properties
            .iter()
            .map(|property| {
                let values = self.property(halo, property, Kind::History)?;

                if values.len() == times.len() {
                    Ok(values.to_vec())
                } else {
                    Err(CatalogError::HistoryLength {
                        halo: halo.number,
                        property: property.clone(),
                        expected: times.len(),
                        found: values.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(History { times, series })
    }
}

/// An error associated with looking up data in a simulation database.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogError {
    /// No snapshot matches.
    SnapshotNotFound {
        /// Simulation name.
        simulation: String,
        /// Snapshot name pattern.
        pattern: String,
    },
    /// A snapshot was added twice.
    DuplicateSnapshot {
        /// Simulation name.
        simulation: String,
        /// Snapshot name.
        name: String,
    },
    /// The halo does not exist in the snapshot.
    HaloNotFound {
        /// Snapshot name.
        snapshot: String,
        /// Halo number.
        halo: HaloNumber,
    },
    /// The property is unknown to the simulation.
    PropertyNotFound {
        /// Property name.
        property: String,
    },
    /// The property is known, but not calculated for this halo.
    NotCalculated {
        /// Halo number.
        halo: HaloNumber,
        /// Property name.
        property: String,
    },
    /// A progenitor history property does not match the length of the history.
    HistoryLength {
        /// Halo number.
        halo: HaloNumber,
        /// Property name.
        property: String,
        /// Length of the history.
        expected: usize,
        /// Length of the property series.
        found: usize,
    },
}

impl CatalogError {
    /// Returns the property this error concerns, if it concerns a single property.
    pub fn property(&self) -> Option<&str> {
        match self {
            CatalogError::PropertyNotFound { property }
            | CatalogError::NotCalculated { property, .. }
            | CatalogError::HistoryLength { property, .. } => Some(property),
            _ => None,
        }
    }

    /// Returns a short description of the kind of error.
    pub fn reason(&self) -> &'static str {
        match self {
            CatalogError::SnapshotNotFound { .. } => "snapshot not found",
            CatalogError::DuplicateSnapshot { .. } => "duplicate snapshot",
            CatalogError::HaloNotFound { .. } => "halo not found",
            CatalogError::PropertyNotFound { .. } => "property not found",
            CatalogError::NotCalculated { .. } => "property not calculated for halo",
            CatalogError::HistoryLength { .. } => "progenitor history length mismatch",
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::SnapshotNotFound {
                simulation,
                pattern,
            } => write!(
                f,
                "could not find snapshot matching '{pattern}' in simulation '{simulation}'"
            ),
            CatalogError::DuplicateSnapshot { simulation, name } => {
                write!(f, "snapshot '{name}' occurs twice in simulation '{simulation}'")
            }
            CatalogError::HaloNotFound { snapshot, halo } => {
                write!(f, "could not find halo {halo} in snapshot '{snapshot}'")
            }
            CatalogError::PropertyNotFound { property } => {
                write!(f, "property not found: '{property}'")
            }
            CatalogError::NotCalculated { halo, property } => {
                write!(f, "property '{property}' not calculated for halo {halo}")
            }
            CatalogError::HistoryLength {
                halo,
                property,
                expected,
                found,
            } => write!(
                f,
                "progenitor history of property '{property}' for halo {halo} has {found} steps, \
                expected {expected}"
            ),
        }
    }
}

impl std::error::Error for CatalogError {}
