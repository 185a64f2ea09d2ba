use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::{Args, Parser};
use halodb_core::{
    catalog::{read::read_catalog_from_path, Snapshot},
    halo::read_halo_numbers_from_input,
    store::{read_store_from_path, write_store_to_path},
    Catalog, HaloNumber, Input, Mode, Policy, SimulationDatabase, Table,
};

use crate::warnings::Warnings;

/// Options shared by commands that fetch properties from a catalog.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Catalog file.
    ///
    /// The catalog holds the snapshots, halos and property series of one or more simulations.
    /// Gzip-compressed catalogs are supported.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub catalog: PathBuf,

    /// Add time-histogram properties.
    ///
    /// By default, properties are followed along the progenitor history of each halo. With this
    /// flag, properties are instead live-calculated for each halo as histograms over time, with
    /// bins given by the pixel time step of the catalog.
    #[arg(long)]
    pub hist: bool,
}

impl SourceArgs {
    pub fn mode(&self) -> Mode {
        if self.hist {
            Mode::Histogram
        } else {
            Mode::Structural
        }
    }

    pub fn read_catalog(&self) -> Result<Catalog, Error> {
        let path = &self.catalog;

        log::debug!("Reading catalog from '{}'", path.display());

        read_catalog_from_path(path)
            .with_context(|| format!("Failed to read catalog from '{}'", path.display()))
    }
}

/// Add properties to a simulation in an existing store.
#[derive(Debug, Parser)]
pub struct AddProperty {
    /// Store file.
    #[arg(value_name = "STORE")]
    store: PathBuf,

    /// Simulation name.
    ///
    /// The store must already hold a table for this simulation.
    #[arg(value_name = "SIM")]
    sim: String,

    /// Properties to add.
    #[arg(required = true, value_name = "PROPERTIES")]
    properties: Vec<String>,

    /// Halo numbers file.
    ///
    /// Each line should contain a single halo number. By default, properties are added for the
    /// halos that already have rows in the table.
    #[arg(long, value_name = "FILE")]
    halos: Option<PathBuf>,

    /// Promote warnings to errors.
    ///
    /// By default, rows that cannot be added, for instance because a halo does not exist or a
    /// property has not been calculated, are skipped with a warning. Using this flag will cause
    /// an error instead, and the store will not be changed.
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    source: SourceArgs,
}

impl AddProperty {
    fn policy(&self) -> Policy {
        if self.strict {
            Policy::Abort
        } else {
            Policy::SkipAndContinue
        }
    }

    pub fn run(self) -> Result<(), Error> {
        let mut store = read_store_from_path(&self.store)
            .with_context(|| format!("Failed to read store from '{}'", self.store.display()))?;
        let table = store.table_mut(&self.sim)?;

        let halos = match &self.halos {
            Some(path) => read_halos(Some(path.clone()))?,
            None => table.halo_numbers(),
        };
        if halos.is_empty() {
            log::warn!("No halos to add properties for.");
        }

        let catalog = self.source.read_catalog()?;
        let header = table.header();
        let snapshot = catalog.snapshot(header.simulation(), header.snapshot())?;

        add_properties(
            table,
            &catalog,
            &snapshot,
            &halos,
            &self.properties,
            self.source.mode(),
            self.policy(),
        )?;

        write_store_to_path(&self.store, &store)
            .with_context(|| format!("Failed to write store to '{}'", self.store.display()))?;

        Ok(())
    }
}

/// Reads halo numbers from a file, or from stdin if no path is given.
pub fn read_halos(path: Option<PathBuf>) -> Result<Vec<HaloNumber>, Error> {
    let input = Input::new(path)?;

    let halos = read_halo_numbers_from_input(&input)
        .with_context(|| match input.as_path() {
            Some(path) => format!("Failed to read halo numbers from '{}'", path.display()),
            None => String::from("Failed to read halo numbers from stdin"),
        })??;

    log::debug!("Read {} halo numbers", halos.len());

    Ok(halos)
}

/// Adds properties to a table, logging rows skipped under [`Policy::SkipAndContinue`].
pub fn add_properties(
    table: &mut Table,
    catalog: &Catalog,
    snapshot: &Snapshot,
    halos: &[HaloNumber],
    properties: &[String],
    mode: Mode,
    policy: Policy,
) -> Result<(), Error> {
    log::info!(
        "Adding {} properties for {} halos from snapshot '{}' ({mode:?})",
        properties.len(),
        halos.len(),
        snapshot.name()
    );

    let report = table.add_properties(catalog, mode.source(), snapshot, halos, properties, policy)?;

    let mut warnings = Warnings::default();
    for failure in report.failures.iter() {
        warnings.warn_once(failure);
    }
    warnings.summarize();

    log::info!("Added {} rows", report.added.len());

    Ok(())
}
