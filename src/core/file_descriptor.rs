/*
 * Defines `FileDescriptor`, the value every other part of the form works with
 * when it refers to a user-chosen file, together with `FileIdentity`, the
 * (name, size, last-modified) tuple used to decide whether two descriptors
 * refer to the same file. The actual bytes stay behind an opaque
 * `ContentHandle` and are only read when a submission is assembled.
 */
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Arc;
use time::OffsetDateTime;

/*
 * Where the bytes of a file can be fetched from. The core never inspects the
 * content; it only hands the handle to the submission worker.
 */
#[derive(Debug, Clone)]
pub enum ContentHandle {
    Path(PathBuf),
    #[cfg(test)]
    Memory(Arc<Vec<u8>>),
}

impl ContentHandle {
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match self {
            ContentHandle::Path(path) => fs::read(path),
            #[cfg(test)]
            ContentHandle::Memory(bytes) => Ok(bytes.as_ref().clone()),
        }
    }
}

// Two descriptors with equal identity are the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub name: String,
    pub byte_size: u64,
    pub last_modified_ms: i64,
}

#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    pub byte_size: u64,
    pub last_modified_ms: i64,
    pub content: ContentHandle,
}

impl FileDescriptor {
    pub fn new(
        name: impl Into<String>,
        byte_size: u64,
        last_modified_ms: i64,
        content: ContentHandle,
    ) -> Self {
        FileDescriptor {
            name: name.into(),
            byte_size,
            last_modified_ms,
            content,
        }
    }

    /*
     * Wraps an in-memory buffer. The size is taken from the buffer so that
     * identity stays consistent with what would be uploaded.
     */
    #[cfg(test)]
    pub fn from_bytes(name: impl Into<String>, last_modified_ms: i64, bytes: Vec<u8>) -> Self {
        let byte_size = bytes.len() as u64;
        FileDescriptor::new(
            name,
            byte_size,
            last_modified_ms,
            ContentHandle::Memory(Arc::new(bytes)),
        )
    }

    /*
     * Builds a descriptor from filesystem metadata. The modification time is
     * converted to Unix milliseconds, the unit browsers report for
     * `lastModified`. Fails if the path has no file name or the metadata
     * cannot be read.
     */
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Path {path:?} has no file name"),
                )
            })?;
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path {path:?} is not a file"),
            ));
        }
        let last_modified_ms = match metadata.modified() {
            Ok(modified) => (OffsetDateTime::from(modified).unix_timestamp_nanos() / 1_000_000) as i64,
            Err(e) => {
                log::warn!("FileDescriptor: No modification time for {path:?}: {e}");
                0
            }
        };
        log::trace!(
            "FileDescriptor: Created '{name}' ({} bytes, modified {last_modified_ms}) from {path:?}",
            metadata.len()
        );
        Ok(FileDescriptor::new(
            name,
            metadata.len(),
            last_modified_ms,
            ContentHandle::Path(path.to_path_buf()),
        ))
    }

    pub fn identity(&self) -> FileIdentity {
        FileIdentity {
            name: self.name.clone(),
            byte_size: self.byte_size,
            last_modified_ms: self.last_modified_ms,
        }
    }

    pub fn same_file(&self, other: &FileDescriptor) -> bool {
        self.identity() == other.identity()
    }
}

// Lower-cased text after the last dot, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_same_file_compares_identity_tuple_only() {
        let a = FileDescriptor::from_bytes("intro.md", 10, b"# Intro".to_vec());
        let b = FileDescriptor::new(
            "intro.md",
            7,
            10,
            ContentHandle::Path(PathBuf::from("/elsewhere/intro.md")),
        );
        let c = FileDescriptor::from_bytes("intro.md", 11, b"# Intro".to_vec());

        assert!(a.same_file(&b), "content location is not part of identity");
        assert_eq!(a.identity(), b.identity());
        assert!(!a.same_file(&c), "a different timestamp is a different file");
    }

    #[test]
    fn test_file_extension_is_lowercased() {
        assert_eq!(file_extension("Notes.MD").as_deref(), Some("md"));
        assert_eq!(file_extension("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_from_path_reads_metadata_and_content() {
        // Arrange
        let mut temp_file = tempfile::Builder::new()
            .prefix("section")
            .suffix(".md")
            .tempfile()
            .unwrap();
        temp_file.write_all(b"## Body\n").unwrap();

        // Act
        let descriptor = FileDescriptor::from_path(temp_file.path()).unwrap();

        // Assert
        assert!(descriptor.name.ends_with(".md"));
        assert_eq!(descriptor.byte_size, 8);
        assert!(descriptor.last_modified_ms > 0);
        assert_eq!(descriptor.content.read_bytes().unwrap(), b"## Body\n");
    }

    #[test]
    fn test_from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileDescriptor::from_path(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_path_missing_file_is_error() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(FileDescriptor::from_path(&path).is_err());
    }
}
