//! Property sources.
//!
//! A property source turns property names into sampled series for one halo. Structural
//! properties are followed along the main progenitor line of the halo, and are sampled at the
//! times of the progenitors. Time-histogram properties are live-calculated for the halo itself,
//! and pixel `i` is taken to be sampled at time `(i + 1) * delta_t`.

use std::fmt;

use crate::catalog::{CatalogError, Halo, SimulationDatabase};

/// A property series with its sample times.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// Property name.
    pub property: String,
    /// Sample times.
    pub times: Vec<f64>,
    /// Sample values.
    pub values: Vec<f64>,
}

/// A failure to fetch a single property.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchError {
    /// Property name.
    pub property: String,
    /// Underlying lookup error.
    pub error: CatalogError,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to fetch '{}': {}", self.property, self.error)
    }
}

impl std::error::Error for FetchError {}

/// A source of property series.
pub trait PropertySource {
    /// Fetches series for `properties` of a halo.
    ///
    /// One result is returned for each requested property, in the order requested.
    fn fetch_series(
        &self,
        database: &dyn SimulationDatabase,
        halo: &Halo,
        properties: &[String],
    ) -> Vec<Result<Series, FetchError>>;
}

/// Which kind of property to fetch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Structural properties along the progenitor history.
    #[default]
    Structural,
    /// Live-calculated time-histogram properties.
    Histogram,
}

impl Mode {
    /// Returns the property source for this mode.
    pub fn source(self) -> &'static dyn PropertySource {
        match self {
            Mode::Structural => &Structural,
            Mode::Histogram => &Histogram,
        }
    }
}

/// Structural properties along the main progenitor line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Structural;

impl PropertySource for Structural {
    fn fetch_series(
        &self,
        database: &dyn SimulationDatabase,
        halo: &Halo,
        properties: &[String],
    ) -> Vec<Result<Series, FetchError>> {
        let mut results: Vec<Option<Result<Series, FetchError>>> = vec![None; properties.len()];
        let mut remaining = (0..properties.len()).collect::<Vec<_>>();

        // A single unavailable property fails the whole history lookup, so drop the offending
        // property and retry with the rest
        while !remaining.is_empty() {
            let names = remaining
                .iter()
                .map(|&i| properties[i].clone())
                .collect::<Vec<_>>();

            match database.progenitor_history(halo, &names) {
                Ok(history) => {
                    for (&i, values) in remaining.iter().zip(history.series) {
                        results[i] = Some(Ok(Series {
                            property: properties[i].clone(),
                            times: history.times.clone(),
                            values,
                        }));
                    }
                    remaining.clear();
                }
                Err(error) => {
                    let failed = error.property().and_then(|property| {
                        remaining.iter().position(|&i| properties[i] == property)
                    });

                    match failed {
                        Some(position) => {
                            let i = remaining.remove(position);
                            results[i] = Some(Err(FetchError {
                                property: properties[i].clone(),
                                error,
                            }));
                        }
                        None => {
                            for i in remaining.drain(..) {
                                results[i] = Some(Err(FetchError {
                                    property: properties[i].clone(),
                                    error: error.clone(),
                                }));
                            }
                        }
                    }
                }
            }
        }

        results.into_iter().flatten().collect()
    }
}

/// Live-calculated time-histogram properties.
///
/// Histogram pixel `i` is taken to be sampled at time `(i + 1) * delta_t`, where `delta_t` is the
/// pixel time step of the database, which coincides with a reference grid of the same step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Histogram;

impl PropertySource for Histogram {
    fn fetch_series(
        &self,
        database: &dyn SimulationDatabase,
        halo: &Halo,
        properties: &[String],
    ) -> Vec<Result<Series, FetchError>> {
        let delta_t = database.pixel_delta_t();

        properties
            .iter()
            .map(|property| {
                database
                    .live_property(halo, property)
                    .map(|values| Series {
                        property: property.clone(),
                        times: (1..=values.len()).map(|k| delta_t * k as f64).collect(),
                        values,
                    })
                    .map_err(|error| FetchError {
                        property: property.clone(),
                        error,
                    })
            })
            .collect()
    }
}
