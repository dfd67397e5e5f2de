//! Reading and writing archives as files.
//!
//! Tree files are JSON, pretty-printed with a one-space indent and a
//! trailing newline. Stream files hold the raw bytes.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::archive::StreamArchive;
use crate::error::Result;

/// Parse a tree archive from a JSON file.
pub fn read_tree(path: impl AsRef<Path>) -> Result<Value> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a tree archive to a JSON file, replacing its contents.
pub fn write_tree(path: impl AsRef<Path>, tree: &Value) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b" "));
    tree.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a stream archive from a file. An empty file gives an empty stream.
pub fn read_stream(path: impl AsRef<Path>) -> Result<StreamArchive> {
    Ok(StreamArchive::from(fs::read(path)?))
}

/// Write the unread bytes of a stream archive to a file, replacing its contents.
pub fn write_stream(path: impl AsRef<Path>, stream: &StreamArchive) -> Result<()> {
    fs::write(path, stream.as_bytes())?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec::Vec;
    use std::fs;
    use std::path::PathBuf;

    use serde_json::json;

    use super::{read_stream, read_tree, write_stream, write_tree};
    use crate::archive::{Archive, StreamArchive};
    use crate::error::ArchiveError;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vc_archive_{}_{name}", std::process::id()))
    }

    #[test]
    fn tree_file() {
        let path = temp_file("tree.json");
        let tree = json!({ "a": 1, "b": [true] });

        write_tree(&path, &tree).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n \"a\": 1,\n \"b\": [\n  true\n ]\n}\n");
        assert_eq!(read_tree(&path).unwrap(), tree);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn stream_file() {
        let path = temp_file("stream.bin");
        let mut stream = StreamArchive::new();
        stream.push(&258_u16).unwrap();

        write_stream(&path, &stream).unwrap();
        let mut loaded = read_stream(&path).unwrap();
        assert_eq!(loaded.read::<u16>().unwrap(), 258);

        fs::write(&path, Vec::new()).unwrap();
        assert!(read_stream(&path).unwrap().is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file() {
        let path = temp_file("missing.json");
        assert!(matches!(read_tree(&path), Err(ArchiveError::Io(_))));
    }
}
