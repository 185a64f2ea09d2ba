//! Table header.
//!
//! The header records where the rows of a table came from, and the parameters of its reference
//! grid. The grid itself is never stored: it is reconstructed from the header whenever a table
//! is read.
//!
//! In text form, the header consists of four lines of the form `#KEY=<value>`:
//!
//! ```text
//! #SIMULATION=<h148>
//! #SNAPSHOT=<h148.004096>
//! #CURRENT_T=<13.8>
//! #DELTA_T=<0.1>
//! ```
//!
//! Times are written with the shortest representation that reads back to the same value.

use std::{fmt, str::FromStr};

use crate::{grid::GridError, Grid};

const SIMULATION: &str = "SIMULATION";
const SNAPSHOT: &str = "SNAPSHOT";
const CURRENT_T: &str = "CURRENT_T";
const DELTA_T: &str = "DELTA_T";

/// A table header.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    simulation: String,
    snapshot: String,
    current_t: f64,
    delta_t: f64,
}

impl Header {
    /// Creates a new header.
    pub fn new<S, T>(simulation: S, snapshot: T, current_t: f64, delta_t: f64) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            simulation: simulation.into(),
            snapshot: snapshot.into(),
            current_t,
            delta_t,
        }
    }

    /// Returns the final time of the reference grid (exclusive).
    pub fn current_t(&self) -> f64 {
        self.current_t
    }

    /// Returns the step of the reference grid.
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// Reconstructs the reference grid.
    pub fn grid(&self) -> Result<Grid, GridError> {
        Grid::new(self.delta_t, self.current_t)
    }

    /// Returns the simulation name.
    pub fn simulation(&self) -> &str {
        &self.simulation
    }

    /// Returns the snapshot identifier.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{SIMULATION}=<{}>", self.simulation)?;
        writeln!(f, "#{SNAPSHOT}=<{}>", self.snapshot)?;
        writeln!(f, "#{CURRENT_T}=<{}>", self.current_t)?;
        write!(f, "#{DELTA_T}=<{}>", self.delta_t)
    }
}

impl FromStr for Header {
    type Err = ParseHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut simulation = None;
        let mut snapshot = None;
        let mut current_t = None;
        let mut delta_t = None;

        for line in s.lines().filter(|line| !line.trim().is_empty()) {
            let (key, value) = parse_field(line)?;

            let slot = match key {
                SIMULATION => &mut simulation,
                SNAPSHOT => &mut snapshot,
                CURRENT_T => &mut current_t,
                DELTA_T => &mut delta_t,
                _ => return Err(ParseHeaderError::UnknownField(key.to_string())),
            };

            if slot.replace(value).is_some() {
                return Err(ParseHeaderError::DuplicateField(key.to_string()));
            }
        }

        let parse_time = |value: &str, key: &'static str| {
            f64::from_str(value).map_err(|_| ParseHeaderError::InvalidTime {
                key,
                value: value.to_string(),
            })
        };

        Ok(Self::new(
            require(simulation, SIMULATION)?,
            require(snapshot, SNAPSHOT)?,
            parse_time(require(current_t, CURRENT_T)?, CURRENT_T)?,
            parse_time(require(delta_t, DELTA_T)?, DELTA_T)?,
        ))
    }
}

fn require<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ParseHeaderError> {
    value.ok_or(ParseHeaderError::MissingField(key))
}

/// Splits a `#KEY=<value>` line into its key and value.
pub(crate) fn parse_field(line: &str) -> Result<(&str, &str), ParseHeaderError> {
    line.trim()
        .strip_prefix('#')
        .and_then(|field| field.split_once('='))
        .and_then(|(key, value)| {
            value
                .strip_prefix('<')
                .and_then(|value| value.strip_suffix('>'))
                .map(|value| (key.trim(), value))
        })
        .ok_or_else(|| ParseHeaderError::InvalidLine(line.to_string()))
}

/// An error associated with parsing a header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseHeaderError {
    /// A line is not of the form `#KEY=<value>`.
    InvalidLine(String),
    /// A field is not a known header field.
    UnknownField(String),
    /// A field occurs more than once.
    DuplicateField(String),
    /// A required field is absent.
    MissingField(&'static str),
    /// A time field does not hold a number.
    InvalidTime {
        /// Field name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

impl fmt::Display for ParseHeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHeaderError::InvalidLine(line) => {
                write!(f, "failed to parse '{line}' as header field")
            }
            ParseHeaderError::UnknownField(key) => write!(f, "unknown header field '{key}'"),
            ParseHeaderError::DuplicateField(key) => write!(f, "duplicate header field '{key}'"),
            ParseHeaderError::MissingField(key) => write!(f, "missing header field '{key}'"),
            ParseHeaderError::InvalidTime { key, value } => {
                write!(f, "failed to parse '{value}' as time for header field '{key}'")
            }
        }
    }
}

impl std::error::Error for ParseHeaderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_header() {
        let header = Header::new("h148", "h148.004096", 13.8, 0.1);

        assert_eq!(
            header.to_string(),
            "#SIMULATION=<h148>\n#SNAPSHOT=<h148.004096>\n#CURRENT_T=<13.8>\n#DELTA_T=<0.1>"
        );
    }

    #[test]
    fn test_parse_header() {
        let header = Header::from_str(
            "#DELTA_T=<1>\n#SIMULATION=<sim/a b>\n#CURRENT_T=<4>\n#SNAPSHOT=<004096>\n",
        )
        .unwrap();

        assert_eq!(header, Header::new("sim/a b", "004096", 4.0, 1.0));
    }

    #[test]
    fn test_header_reproduces_grid() {
        let header = Header::new("sim", "snap", 13.7999999999, 0.1 + 0.2);
        let parsed = Header::from_str(&header.to_string()).unwrap();

        assert_eq!(parsed.grid().unwrap(), header.grid().unwrap());
        assert_eq!(parsed.delta_t().to_bits(), header.delta_t().to_bits());
    }

    #[test]
    fn test_parse_header_missing_field() {
        assert_eq!(
            Header::from_str("#SIMULATION=<a>\n#SNAPSHOT=<b>\n#CURRENT_T=<4>"),
            Err(ParseHeaderError::MissingField(DELTA_T))
        );
    }

    #[test]
    fn test_parse_header_duplicate_field() {
        assert_eq!(
            Header::from_str("#SIMULATION=<a>\n#SIMULATION=<b>"),
            Err(ParseHeaderError::DuplicateField(String::from(SIMULATION)))
        );
    }

    #[test]
    fn test_parse_header_invalid_time() {
        let result =
            Header::from_str("#SIMULATION=<a>\n#SNAPSHOT=<b>\n#CURRENT_T=<x>\n#DELTA_T=<1>");

        assert!(matches!(
            result,
            Err(ParseHeaderError::InvalidTime { key: CURRENT_T, .. })
        ));
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("#TABLE=<h148>"), Ok(("TABLE", "h148")));
        assert_eq!(parse_field("#TABLE=<>"), Ok(("TABLE", "")));
        assert!(parse_field("TABLE=<h148>").is_err());
        assert!(parse_field("#TABLE=h148").is_err());
    }
}
