use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::Parser;
use halodb_core::store::{read_store_from_path, write_store_to_path};

/// Delete properties from a simulation in a store.
///
/// Either all rows of the properties are deleted, or, if any property has no rows in the table,
/// nothing is deleted.
#[derive(Debug, Parser)]
pub struct DeleteProperty {
    /// Store file.
    #[arg(value_name = "STORE")]
    store: PathBuf,

    /// Simulation name.
    #[arg(value_name = "SIM")]
    sim: String,

    /// Properties to delete.
    #[arg(required = true, value_name = "PROPERTIES")]
    properties: Vec<String>,
}

impl DeleteProperty {
    pub fn run(self) -> Result<(), Error> {
        let mut store = read_store_from_path(&self.store)
            .with_context(|| format!("Failed to read store from '{}'", self.store.display()))?;

        let removed = store
            .table_mut(&self.sim)?
            .delete_properties(&self.properties)?;

        log::info!(
            "Deleted {removed} rows for {} properties from simulation '{}'",
            self.properties.len(),
            self.sim
        );

        write_store_to_path(&self.store, &store)
            .with_context(|| format!("Failed to write store to '{}'", self.store.display()))?;

        Ok(())
    }
}
