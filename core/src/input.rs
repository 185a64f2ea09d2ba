//! Input sources for reading halo lists, catalogs, and stores.

use std::{
    env,
    fs::File,
    io::{self, IsTerminal as _},
    path::{Path, PathBuf},
};

use flate2::bufread::MultiGzDecoder;

/// An input source for reading.
#[derive(Debug)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, reading an `Input` checks that either a path is provided, or that input is
    /// available via stdin, instead of hanging.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "HALODB_ALLOW_STDIN";

    /// Creates a new input source.
    pub fn new(input: Option<PathBuf>) -> io::Result<Self> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        if input.is_none() && io::stdin().is_terminal() && check {
            Err(io::Error::new(
                io::ErrorKind::Other,
                "received no input via file or stdin",
            ))
        } else {
            Ok(Self::new_unchecked(input))
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        if let Some(path) = input {
            Self::Path(path)
        } else {
            Self::Stdin
        }
    }

    /// Open the input for reading.
    pub fn open(&self) -> io::Result<Reader> {
        match self {
            Input::Path(path) => File::open(path).map(io::BufReader::new).map(Reader::File),
            Input::Stdin => Ok(Reader::Stdin(io::stdin().lock())),
        }
    }

    /// Returns the provided path if provided, otherwise `None`.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Input::Path(path) => Some(path.as_ref()),
            Input::Stdin => None,
        }
    }
}

/// A reader from either a file or stdin.
#[derive(Debug)]
pub enum Reader {
    /// A reader from a file.
    File(io::BufReader<File>),
    /// A reader stdin.
    Stdin(io::StdinLock<'static>),
}

/// Wraps a reader in a gzip decoder if its content is gzip-compressed.
pub(crate) fn decompressed<R>(mut reader: R) -> io::Result<Box<dyn io::BufRead>>
where
    R: 'static + io::BufRead,
{
    Ok(match CompressionMethod::detect(&mut reader)? {
        Some(CompressionMethod::Gzip) => {
            Box::new(io::BufReader::new(MultiGzDecoder::new(reader)))
        }
        None => Box::new(reader),
    })
}

/// A compression method for input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Gzip, including multi-member and BGZF.
    Gzip,
}

impl CompressionMethod {
    /// Detects the compression method from the start of a reader without consuming it.
    pub fn detect<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: io::BufRead,
    {
        const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

        let src = reader.fill_buf()?;

        if let Some(buf) = src.get(..GZIP_MAGIC_NUMBER.len()) {
            if buf == GZIP_MAGIC_NUMBER {
                return Ok(Some(CompressionMethod::Gzip));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read as _, Write as _};

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn test_detect_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1\n2\n").unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(
            CompressionMethod::detect(&mut &bytes[..]).unwrap(),
            Some(CompressionMethod::Gzip)
        );

        let mut s = String::new();
        decompressed(io::Cursor::new(bytes))
            .unwrap()
            .read_to_string(&mut s)
            .unwrap();
        assert_eq!(s, "1\n2\n");
    }

    #[test]
    fn test_detect_plain() {
        assert_eq!(CompressionMethod::detect(&mut &b"1\n2\n"[..]).unwrap(), None);
        assert_eq!(CompressionMethod::detect(&mut &b""[..]).unwrap(), None);
    }
}
