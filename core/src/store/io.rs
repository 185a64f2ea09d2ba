//! Utilities for reading and writing stores.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::input;

use super::{text, Store};

/// Reads a store from a reader.
///
/// Gzip-compressed input is decompressed transparently.
pub fn read_store<R>(reader: R) -> io::Result<Store>
where
    R: 'static + io::BufRead,
{
    let mut reader = input::decompressed(reader)?;

    let mut s = String::new();
    let _ = io::Read::read_to_string(&mut reader, &mut s)?;

    text::parse_store(&s)
}

/// Reads a store from path.
pub fn read_store_from_path<P>(path: P) -> io::Result<Store>
where
    P: AsRef<Path>,
{
    read_store(io::BufReader::new(fs::File::open(path)?))
}

/// Reads a store from path, or returns an empty store if the path does not exist.
pub fn read_store_from_path_or_default<P>(path: P) -> io::Result<Store>
where
    P: AsRef<Path>,
{
    match read_store_from_path(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Store::default()),
        result => result,
    }
}

/// Writes a store to a writer.
pub fn write_store<W>(writer: &mut W, store: &Store) -> io::Result<()>
where
    W: io::Write,
{
    text::write_store(writer, store)
}

/// Writes a store to path.
///
/// The store is first written to a sibling file with a `.tmp` suffix, which is then renamed onto
/// path. If path already exists, it is only replaced once the full store has been written.
pub fn write_store_to_path<P>(path: P, store: &Store) -> io::Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let tmp_path = tmp_path(path);

    let result =
        write_store_to_new_file(&tmp_path, store).and_then(|()| fs::rename(&tmp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

fn write_store_to_new_file(path: &Path, store: &Store) -> io::Result<()> {
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    write_store(&mut writer, store)?;

    writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?
        .sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use flate2::{write::GzEncoder, Compression};

    use crate::Header;

    #[test]
    fn test_read_gzipped_store() -> io::Result<()> {
        let mut store = Store::new();
        store
            .initialize(Header::new("sim", "snap", 4.0, 1.0))
            .unwrap();

        let mut plain = Vec::new();
        write_store(&mut plain, &store)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&plain)?;
        let compressed = encoder.finish()?;

        assert_eq!(read_store(io::Cursor::new(compressed))?, store);
        assert_eq!(read_store(io::Cursor::new(plain))?, store);

        Ok(())
    }

    #[test]
    fn test_write_replaces_existing_file() -> io::Result<()> {
        let name = format!("halodb-test-write-{}.halodb", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, "not a store")?;

        let mut store = Store::new();
        store
            .initialize(Header::new("sim", "snap", 4.0, 1.0))
            .unwrap();

        write_store_to_path(&path, &store)?;

        assert_eq!(read_store_from_path(&path)?, store);
        assert!(!tmp_path(&path).exists());

        fs::remove_file(&path)
    }

    #[test]
    fn test_failed_write_keeps_existing_file() -> io::Result<()> {
        let name = format!("halodb-test-dir-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        fs::create_dir_all(&dir)?;
        let path = dir.join("data.halodb");
        fs::write(&path, "existing")?;

        // The temporary file cannot be created where a directory already exists.
        fs::create_dir_all(tmp_path(&path))?;

        assert!(write_store_to_path(&path, &Store::new()).is_err());
        assert_eq!(fs::read_to_string(&path)?, "existing");

        fs::remove_dir_all(&dir)
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        assert_eq!(
            tmp_path(Path::new("dir/data.halodb")),
            PathBuf::from("dir/data.halodb.tmp")
        );
    }

    #[test]
    fn test_read_missing_path_or_default() -> io::Result<()> {
        let path = std::env::temp_dir().join("halodb-test-store-does-not-exist.halodb");

        assert!(read_store_from_path_or_default(path)?.is_empty());

        Ok(())
    }
}
