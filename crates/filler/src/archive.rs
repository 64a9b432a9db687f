//! ZIP packaging of filled documents

use crate::{FillError, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack named byte blobs into a deflate ZIP, in the given order
pub fn pack(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in entries {
            zip.start_file(name.as_str(), options)
                .map_err(|e| FillError::Archive(format!("Failed to create entry {name}: {e}")))?;
            zip.write_all(bytes)
                .map_err(|e| FillError::Archive(format!("Failed to write entry {name}: {e}")))?;
        }

        zip.finish()
            .map_err(|e| FillError::Archive(format!("Failed to finalize archive: {e}")))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_pack() {
        let bytes = pack(&[
            ("a.pdf".to_string(), b"%PDF-a".to_vec()),
            ("b.pdf".to_string(), b"%PDF-b".to_vec()),
        ])
        .unwrap();

        assert!(bytes.starts_with(b"PK\x03\x04"));

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("b.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-b");
    }

    #[test]
    fn test_pack_empty() {
        let bytes = pack(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
