use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Source text plus the timestamp it was read at.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub text: String,
    pub last_write: SystemTime,
}

/// Access to shader sources. The registry only reads through this trait.
pub trait SourceReader {
    fn read(&self, path: &Path) -> io::Result<SourceFile>;

    /// Stats the file without reading it.
    fn last_write(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Reads sources from the local filesystem.
#[derive(Debug, Default, Copy, Clone)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<SourceFile> {
        let last_write = self.last_write(path)?;
        let text = std::fs::read_to_string(path)?;
        Ok(SourceFile { text, last_write })
    }

    fn last_write(&self, path: &Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    /// In-memory sources with a manually advanced clock.
    #[derive(Default)]
    pub struct MemoryReader {
        files: RefCell<HashMap<PathBuf, SourceFile>>,
        clock: RefCell<u64>,
    }

    impl MemoryReader {
        pub fn write(&self, path: &str, text: &str) {
            let mut clock = self.clock.borrow_mut();
            *clock += 1;
            let last_write = SystemTime::UNIX_EPOCH + Duration::from_secs(*clock);
            self.files
                .borrow_mut()
                .insert(PathBuf::from(path), SourceFile { text: text.to_owned(), last_write });
        }
    }

    impl SourceReader for MemoryReader {
        fn read(&self, path: &Path) -> io::Result<SourceFile> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
        }

        fn last_write(&self, path: &Path) -> io::Result<SystemTime> {
            self.read(path).map(|f| f.last_write)
        }
    }
}
