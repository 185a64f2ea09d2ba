use std::path::PathBuf;

use anyhow::{Context, Error};

use clap::Parser;

mod runner;
use runner::Runner;

/// Print tables in a store.
#[derive(Debug, Parser)]
pub struct Show {
    /// Store file.
    #[arg(value_name = "STORE")]
    pub store: PathBuf,

    /// Simulation name.
    ///
    /// If provided, the table of this simulation is printed. Otherwise, a summary of each table
    /// in the store is printed.
    #[arg(value_name = "SIM")]
    pub sim: Option<String>,

    /// Delimiter between fields.
    #[arg(short = 'd', long, default_value_t = '\t', value_name = "CHAR")]
    pub delimiter: char,

    /// Precision to use when printing row values.
    #[arg(short = 'p', long, default_value_t = 6, value_name = "INT")]
    pub precision: usize,
}

impl Show {
    pub fn run(self) -> Result<(), Error> {
        let mut runner = Runner::try_from(&self)
            .with_context(|| format!("Failed to read store from '{}'", self.store.display()))?;

        runner.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::parse_subcmd;

    #[test]
    fn test_defaults() {
        let args = parse_subcmd::<Show>("halodb show data.halodb");

        assert_eq!(args.store, PathBuf::from("data.halodb"));
        assert_eq!(args.sim, None);
        assert_eq!(args.delimiter, '\t');
        assert_eq!(args.precision, 6);
    }

    #[test]
    fn test_simulation_and_options() {
        let args = parse_subcmd::<Show>("halodb show data.halodb h148 -d , -p 2");

        assert_eq!(args.sim.as_deref(), Some("h148"));
        assert_eq!(args.delimiter, ',');
        assert_eq!(args.precision, 2);
    }
}
