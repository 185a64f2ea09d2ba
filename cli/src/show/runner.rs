use std::{fmt, io};

use anyhow::Error;

use halodb_core::{store::read_store_from_path, Store, Table};

use super::Show;

#[derive(Debug)]
pub struct Runner<W> {
    writer: W,
    store: Store,
    simulation: Option<String>,
    delimiter: char,
    precision: usize,
}

impl<W> Runner<W>
where
    W: io::Write,
{
    pub fn new(
        writer: W,
        store: Store,
        simulation: Option<String>,
        delimiter: char,
        precision: usize,
    ) -> Self {
        Self {
            writer,
            store,
            simulation,
            delimiter,
            precision,
        }
    }

    pub fn run(&mut self) -> Result<(), Error> {
        match &self.simulation {
            Some(simulation) => {
                let table = self.store.table(simulation)?;
                write_table(&mut self.writer, table, self.delimiter, self.precision)
            }
            None => write_summary(&mut self.writer, &self.store, self.delimiter),
        }
    }
}

fn write_summary<W>(writer: &mut W, store: &Store, delimiter: char) -> Result<(), Error>
where
    W: io::Write,
{
    write_with_delimiter(
        writer,
        delimiter,
        [
            "simulation",
            "snapshot",
            "current_t",
            "delta_t",
            "halos",
            "properties",
            "rows",
        ],
    )?;

    for table in store.tables() {
        let header = table.header();

        write_with_delimiter(
            writer,
            delimiter,
            [
                header.simulation().to_string(),
                header.snapshot().to_string(),
                header.current_t().to_string(),
                header.delta_t().to_string(),
                table.halo_numbers().len().to_string(),
                table.properties().len().to_string(),
                table.len().to_string(),
            ],
        )?;
    }

    Ok(())
}

fn write_table<W>(
    writer: &mut W,
    table: &Table,
    delimiter: char,
    precision: usize,
) -> Result<(), Error>
where
    W: io::Write,
{
    writeln!(writer, "{}", table.header())?;

    let format = |x: &f64| format!("{x:.precision$}");

    write_with_delimiter(
        writer,
        delimiter,
        ["halo", "property"]
            .into_iter()
            .map(String::from)
            .chain(table.grid().iter().map(format)),
    )?;

    for (key, row) in table.iter() {
        write_with_delimiter(
            writer,
            delimiter,
            [key.halo.to_string(), key.property.clone()]
                .into_iter()
                .chain(row.iter().map(format)),
        )?;
    }

    Ok(())
}

fn write_with_delimiter<W, I>(writer: &mut W, delimiter: char, items: I) -> Result<(), Error>
where
    W: io::Write,
    I: IntoIterator,
    I::Item: fmt::Display,
{
    for (i, x) in items.into_iter().enumerate() {
        if i > 0 {
            write!(writer, "{delimiter}")?;
        }
        write!(writer, "{x}")?;
    }
    writeln!(writer)?;

    Ok(())
}

impl TryFrom<&Show> for Runner<io::StdoutLock<'static>> {
    type Error = Error;

    fn try_from(args: &Show) -> Result<Self, Self::Error> {
        let store = read_store_from_path(&args.store)?;

        Ok(Self::new(
            io::stdout().lock(),
            store,
            args.sim.clone(),
            args.delimiter,
            args.precision,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use halodb_core::{Header, HaloNumber, Key};

    fn store() -> Store {
        let mut store = Store::new();

        let table = store
            .initialize(Header::new("sim", "sim.004096", 4.0, 1.0))
            .unwrap();
        table
            .insert(Key::new(HaloNumber(7), "p"), vec![10.0, f64::NAN, 20.0])
            .unwrap();
        table
            .insert(Key::new(HaloNumber(8), "p"), vec![f64::NAN, f64::NAN, 30.0])
            .unwrap();

        store
    }

    fn run(simulation: Option<&str>, delimiter: char, precision: usize) -> Result<String, Error> {
        let mut runner = Runner::new(
            Vec::new(),
            store(),
            simulation.map(String::from),
            delimiter,
            precision,
        );
        runner.run()?;

        Ok(String::from_utf8(runner.writer)?)
    }

    #[test]
    fn test_write_summary() -> Result<(), Error> {
        assert_eq!(
            run(None, '\t', 6)?,
            "simulation\tsnapshot\tcurrent_t\tdelta_t\thalos\tproperties\trows\n\
            sim\tsim.004096\t4\t1\t2\t1\t2\n"
        );

        Ok(())
    }

    #[test]
    fn test_write_table() -> Result<(), Error> {
        assert_eq!(
            run(Some("sim"), ',', 1)?,
            "#SIMULATION=<sim>\n\
            #SNAPSHOT=<sim.004096>\n\
            #CURRENT_T=<4>\n\
            #DELTA_T=<1>\n\
            halo,property,1.0,2.0,3.0\n\
            7,p,10.0,NaN,20.0\n\
            8,p,NaN,NaN,30.0\n"
        );

        Ok(())
    }

    #[test]
    fn test_table_not_found() {
        let error = run(Some("other"), '\t', 6).unwrap_err();

        assert_eq!(error.to_string(), "no table found for simulation 'other'");
    }
}
