//! Reading catalogs.
//!
//! A catalog file is a plain text file (optionally gzip-compressed) with one record per line.
//! The file starts with a `#PIXEL_DELTA_T=<step>` line giving the pixel time step of
//! time-histogram properties. Each following line is a tab-separated record:
//!
//! ```text
//! snapshot  <simulation>  <snapshot>  <time>
//! halo      <simulation>  <snapshot>  <number>
//! history   <simulation>  <snapshot>  <number>  <property>  <v0 v1 ...>
//! live      <simulation>  <snapshot>  <number>  <property>  <v0 v1 ...>
//! ```
//!
//! Values are separated by whitespace. A snapshot must be declared before any record refers to
//! it; halos are declared implicitly by their properties. Blank lines and lines starting with
//! `//` are ignored. The times along a progenitor history are given as the `t()` property.

use std::{fs, io, path::Path, str::FromStr};

use crate::{header::parse_field, input, HaloNumber};

use super::Catalog;

const PIXEL_DELTA_T: &str = "PIXEL_DELTA_T";

/// Reads a catalog from a reader.
///
/// Gzip-compressed input is decompressed transparently.
pub fn read_catalog<R>(reader: R) -> io::Result<Catalog>
where
    R: 'static + io::BufRead,
{
    let mut reader = input::decompressed(reader)?;

    let mut s = String::new();
    let _ = io::Read::read_to_string(&mut reader, &mut s)?;

    parse_catalog(&s)
}

/// Reads a catalog from a path.
pub fn read_catalog_from_path<P>(path: P) -> io::Result<Catalog>
where
    P: AsRef<Path>,
{
    read_catalog(io::BufReader::new(fs::File::open(path)?))
}

fn invalid_data<E>(line: usize, error: E) -> io::Error
where
    E: std::fmt::Display,
{
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid catalog on line {line}: {error}"),
    )
}

fn parse_catalog(s: &str) -> io::Result<Catalog> {
    let mut lines = s
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !(line.trim().is_empty() || line.trim_start().starts_with("//")));

    let mut catalog = match lines.next() {
        Some((i, line)) => {
            let (key, value) = parse_field(line).map_err(|e| invalid_data(i, e))?;

            if key != PIXEL_DELTA_T {
                return Err(invalid_data(
                    i,
                    format!("expected '#{PIXEL_DELTA_T}=<...>', found '{line}'"),
                ));
            }

            let pixel_delta_t = parse_number(value).map_err(|e| invalid_data(i, e))?;
            Catalog::new(pixel_delta_t)
        }
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("empty catalog, expected '#{PIXEL_DELTA_T}=<...>'"),
            ))
        }
    };

    for (i, line) in lines {
        parse_record(&mut catalog, line).map_err(|e| invalid_data(i, e))?;
    }

    Ok(catalog)
}

fn parse_record(catalog: &mut Catalog, line: &str) -> Result<(), String> {
    let fields = line.split('\t').collect::<Vec<_>>();

    match fields[..] {
        ["snapshot", simulation, snapshot, time] => {
            let time = parse_number(time)?;
            catalog
                .add_snapshot(simulation, snapshot, time)
                .map_err(|e| e.to_string())
        }
        ["halo", simulation, snapshot, number] => catalog
            .add_halo(simulation, snapshot, parse_halo_number(number)?)
            .map_err(|e| e.to_string()),
        ["history", simulation, snapshot, number, property, values] => catalog
            .add_history(
                simulation,
                snapshot,
                parse_halo_number(number)?,
                property,
                parse_values(values)?,
            )
            .map_err(|e| e.to_string()),
        ["live", simulation, snapshot, number, property, values] => catalog
            .add_live(
                simulation,
                snapshot,
                parse_halo_number(number)?,
                property,
                parse_values(values)?,
            )
            .map_err(|e| e.to_string()),
        [kind, ..] => Err(format!(
            "unknown record '{kind}' with {} fields",
            fields.len()
        )),
        [] => Err(String::from("empty record")),
    }
}

fn parse_halo_number(s: &str) -> Result<HaloNumber, String> {
    HaloNumber::from_str(s).map_err(|_| format!("failed to parse '{s}' as halo number"))
}

fn parse_number(s: &str) -> Result<f64, String> {
    f64::from_str(s.trim()).map_err(|_| format!("failed to parse '{s}' as number"))
}

pub(crate) fn parse_values(s: &str) -> Result<Vec<f64>, String> {
    s.split_ascii_whitespace().map(parse_number).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use flate2::{write::GzEncoder, Compression};

    use crate::catalog::{SimulationDatabase, TIME_PROPERTY};

    const SRC: &str = "\
#PIXEL_DELTA_T=<0.5>
// snapshots
snapshot\tsim\tsim.004096\t4

history\tsim\tsim.004096\t7\tt()\t1.1 2.9
history\tsim\tsim.004096\t7\tlog10(Mvir)\t10 20
live\tsim\tsim.004096\t7\tSFR_histogram\t0.1 0.2 0.3
halo\tsim\tsim.004096\t9
";

    #[test]
    fn test_read_catalog() {
        let catalog = read_catalog(SRC.as_bytes()).unwrap();

        assert_eq!(catalog.pixel_delta_t(), 0.5);

        let snapshot = catalog.snapshot("sim", "004096").unwrap();
        assert_eq!(snapshot.time(), 4.0);

        let halo = catalog.halo(&snapshot, HaloNumber(7)).unwrap();
        let history = catalog
            .progenitor_history(&halo, &[String::from("log10(Mvir)")])
            .unwrap();
        assert_eq!(history.times, vec![1.1, 2.9]);
        assert_eq!(history.series, vec![vec![10.0, 20.0]]);
        assert_eq!(
            catalog.live_property(&halo, "SFR_histogram").unwrap(),
            vec![0.1, 0.2, 0.3]
        );

        assert!(catalog.halo(&snapshot, HaloNumber(9)).is_ok());
    }

    #[test]
    fn test_read_gzipped_catalog() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SRC.as_bytes()).unwrap();
        let bytes = encoder.finish().unwrap();

        let catalog = read_catalog(io::Cursor::new(bytes)).unwrap();

        assert_eq!(catalog, read_catalog(SRC.as_bytes()).unwrap());
    }

    #[test]
    fn test_read_catalog_missing_pixel_delta_t() {
        let src = "snapshot\tsim\tsim.004096\t4\n";

        let error = read_catalog(src.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_read_catalog_empty() {
        assert!(read_catalog(&b""[..]).is_err());
    }

    #[test]
    fn test_read_catalog_undeclared_snapshot() {
        let src = format!("#PIXEL_DELTA_T=<1>\nhistory\tsim\tsnap\t1\t{TIME_PROPERTY}\t1\n");

        let error = read_catalog(io::Cursor::new(src.into_bytes())).unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_catalog_unknown_record() {
        let src = "#PIXEL_DELTA_T=<1>\nsnapshot\tsim\tsnap\n";

        let error = read_catalog(src.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("unknown record 'snapshot'"));
    }

    #[test]
    fn test_read_catalog_invalid_value() {
        let src = "#PIXEL_DELTA_T=<1>\nsnapshot\tsim\tsnap\t4\nlive\tsim\tsnap\t1\th\t1 x\n";

        let error = read_catalog(src.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("failed to parse 'x' as number"));
    }
}
