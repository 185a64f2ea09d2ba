//! Reading and writing for the text format.
//!
//! Each table in the store starts with a `#TABLE=<simulation>` line, followed by the four
//! lines of its [`Header`], and then one line per row. A row line consists of the halo number,
//! the property name, and the row values, separated by tabs. Row values are separated by a
//! single space, with missing values written as `NaN`:
//!
//! ```text
//! #TABLE=<h148>
//! #SIMULATION=<h148>
//! #SNAPSHOT=<h148.004096>
//! #CURRENT_T=<4>
//! #DELTA_T=<1>
//! 7	log10(Mvir)	10 NaN 20
//! ```
//!
//! Values are written with the shortest representation that reads back to the same value.
//! Blank lines are ignored.

use std::{io, str::FromStr};

use crate::{
    catalog::read::parse_values, header::parse_field, table::Key, HaloNumber, Header, Table,
};

use super::Store;

/// The text format start string.
pub(crate) const START: &str = "#TABLE";

fn invalid_data<E>(line: usize, error: E) -> io::Error
where
    E: std::fmt::Display,
{
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid store on line {line}: {error}"),
    )
}

/// A table being read.
struct Section {
    name: String,
    start: usize,
    header: String,
    table: Option<Table>,
}

impl Section {
    fn new(name: &str, start: usize) -> Self {
        Self {
            name: name.to_string(),
            start,
            header: String::new(),
            table: None,
        }
    }

    fn read_header(&self) -> io::Result<Table> {
        let header = Header::from_str(&self.header).map_err(|e| invalid_data(self.start, e))?;

        if header.simulation() != self.name {
            return Err(invalid_data(
                self.start,
                format!(
                    "table '{}' has header for simulation '{}'",
                    self.name,
                    header.simulation()
                ),
            ));
        }

        Table::new(header).map_err(|e| invalid_data(self.start, e))
    }

    fn table(&mut self) -> io::Result<&mut Table> {
        let table = match self.table.take() {
            Some(table) => table,
            None => self.read_header()?,
        };

        Ok(self.table.insert(table))
    }

    fn finish(mut self, store: &mut Store) -> io::Result<()> {
        let start = self.start;
        let table = match self.table.take() {
            Some(table) => table,
            None => self.read_header()?,
        };

        store
            .insert(table)
            .map(|_| ())
            .map_err(|e| invalid_data(start, e))
    }
}

/// Parses a store in text format.
pub fn parse_store(s: &str) -> io::Result<Store> {
    let mut store = Store::new();
    let mut section: Option<Section> = None;

    for (i, line) in s.lines().enumerate().map(|(i, line)| (i + 1, line)) {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(START) {
            let (_, name) = parse_field(line).map_err(|e| invalid_data(i, e))?;

            if let Some(previous) = section.replace(Section::new(name, i)) {
                previous.finish(&mut store)?;
            }
        } else if line.starts_with('#') {
            match section.as_mut() {
                Some(section) if section.table.is_none() => {
                    section.header.push_str(line);
                    section.header.push('\n');
                }
                _ => return Err(invalid_data(i, format!("unexpected header line '{line}'"))),
            }
        } else {
            let section = section
                .as_mut()
                .ok_or_else(|| invalid_data(i, "row outside of table"))?;

            let (key, row) = parse_row(line).map_err(|e| invalid_data(i, e))?;
            section
                .table()?
                .insert(key, row)
                .map_err(|e| invalid_data(i, e))?;
        }
    }

    if let Some(section) = section {
        section.finish(&mut store)?;
    }

    Ok(store)
}

fn parse_row(line: &str) -> Result<(Key, Vec<f64>), String> {
    let mut fields = line.splitn(3, '\t');

    match (fields.next(), fields.next(), fields.next()) {
        (Some(halo), Some(property), Some(values)) => {
            let halo = HaloNumber::from_str(halo)
                .map_err(|_| format!("failed to parse '{halo}' as halo number"))?;

            Ok((Key::new(halo, property), parse_values(values)?))
        }
        _ => Err(format!("failed to parse '{line}' as row")),
    }
}

/// Formats a row in text format.
pub(crate) fn format_row(key: &Key, row: &[f64]) -> String {
    let values = row
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!("{}\t{}\t{values}", key.halo, key.property)
}

/// Writes a store in text format to a writer.
pub fn write_store<W>(writer: &mut W, store: &Store) -> io::Result<()>
where
    W: io::Write,
{
    for table in store.tables() {
        let header = table.header();

        writeln!(writer, "{START}=<{}>", header.simulation())?;
        writeln!(writer, "{header}")?;

        for (key, row) in table.iter() {
            writeln!(writer, "{}", format_row(key, row))?;
        }
    }

    Ok(())
}
