use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::Parser;
use halodb_core::{
    store::{read_store_from_path_or_default, write_store_to_path},
    Header, Policy, SimulationDatabase,
};

use crate::add::{add_properties, read_halos, SourceArgs};

/// Add a simulation to a new or existing store.
///
/// Any row that cannot be added is an error, and the store is left unchanged.
#[derive(Debug, Parser)]
pub struct AddSimulation {
    /// Simulation name.
    #[arg(value_name = "SIM")]
    sim: String,

    /// Snapshot of interest.
    ///
    /// This is usually the most recent snapshot in the time series. The first snapshot of the
    /// simulation whose name ends with this pattern is used, and its time sets the end of the
    /// reference time grid.
    #[arg(value_name = "SNAP")]
    snap: String,

    /// Halo numbers file.
    ///
    /// Each line should contain a single halo number. If no file is provided, stdin will be used.
    #[arg(value_name = "HALOS")]
    halos: Option<PathBuf>,

    /// Store file.
    ///
    /// If the store does not exist, it will be created.
    #[arg(short = 'f', long, default_value = "data.halodb", value_name = "PATH")]
    filename: PathBuf,

    /// Initial properties to add.
    #[arg(
        short = 'P',
        long,
        num_args = 1..,
        default_value = "log10(Mvir)",
        value_name = "PROPERTIES"
    )]
    properties: Vec<String>,

    #[command(flatten)]
    source: SourceArgs,
}

impl AddSimulation {
    pub fn run(self) -> Result<(), Error> {
        let halos = read_halos(self.halos)?;
        let catalog = self.source.read_catalog()?;
        let snapshot = catalog.snapshot(&self.sim, &self.snap)?;

        let mut store = read_store_from_path_or_default(&self.filename).with_context(|| {
            format!("Failed to read store from '{}'", self.filename.display())
        })?;

        let header = Header::new(
            snapshot.simulation(),
            snapshot.name(),
            snapshot.time(),
            catalog.pixel_delta_t(),
        );
        let table = store.initialize(header)?;

        log::info!(
            "Initialized table for simulation '{}' with {} time points",
            self.sim,
            table.grid().len()
        );

        add_properties(
            table,
            &catalog,
            &snapshot,
            &halos,
            &self.properties,
            self.source.mode(),
            Policy::Abort,
        )?;

        write_store_to_path(&self.filename, &store)
            .with_context(|| format!("Failed to write store to '{}'", self.filename.display()))?;

        Ok(())
    }
}
