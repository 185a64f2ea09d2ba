//! Halo numbers and halo number lists.

use std::{fmt, io, num::ParseIntError, str::FromStr};

use crate::{input, Input};

/// The number of a halo within a snapshot.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HaloNumber(pub u64);

impl From<u64> for HaloNumber {
    fn from(number: u64) -> Self {
        Self(number)
    }
}

impl From<HaloNumber> for u64 {
    fn from(number: HaloNumber) -> Self {
        number.0
    }
}

impl fmt::Display for HaloNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HaloNumber {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str(s.trim()).map(Self)
    }
}

/// Reads a list of halo numbers, one per line.
///
/// Blank lines are skipped. Any other line that is not a non-negative integer is an error.
pub fn read_halo_numbers<R>(reader: &mut R) -> io::Result<Result<Vec<HaloNumber>, ParseHalosError>>
where
    R: io::BufRead,
{
    let mut s = String::new();
    let _ = reader.read_to_string(&mut s)?;

    Ok(parse_halo_numbers(&s))
}

/// Reads a list of halo numbers from an input, as with [`read_halo_numbers`].
pub fn read_halo_numbers_from_input(
    input: &Input,
) -> io::Result<Result<Vec<HaloNumber>, ParseHalosError>> {
    match input.open()? {
        input::Reader::File(mut reader) => read_halo_numbers(&mut reader),
        input::Reader::Stdin(mut reader) => read_halo_numbers(&mut reader),
    }
}

fn parse_halo_numbers(s: &str) -> Result<Vec<HaloNumber>, ParseHalosError> {
    s.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            HaloNumber::from_str(line).map_err(|_| ParseHalosError::InvalidNumber {
                line: i + 1,
                content: line.to_string(),
            })
        })
        .collect()
}

/// An error associated with parsing a list of halo numbers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseHalosError {
    /// A line does not contain a valid halo number.
    InvalidNumber {
        /// Line number, starting from one.
        line: usize,
        /// Line content.
        content: String,
    },
}

impl fmt::Display for ParseHalosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHalosError::InvalidNumber { line, content } => write!(
                f,
                "incorrect type for halo number on line {line}: \
                expected non-negative integer, found '{content}'"
            ),
        }
    }
}

impl std::error::Error for ParseHalosError {}
