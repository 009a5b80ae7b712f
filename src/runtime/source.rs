//! Entry sources.
//!
//! An [`EntrySource`] is one load-path artifact's view into the entries it
//! defines. Production sources wrap a loaded dynamic library (see
//! [`dylib`](crate::runtime::dylib)); tests use [`StaticEntrySource`].

use std::path::{Path, PathBuf};

use crate::core::errors::Result;
use crate::runtime::abi::EntryPoint;

/// One artifact's entry table.
pub trait EntrySource {
    /// Where the artifact came from, for diagnostics.
    fn location(&self) -> &Path;

    /// The entries this artifact defines, in table order.
    fn entries(&self) -> &[EntryPoint];
}

/// Turns a load-path artifact into an [`EntrySource`].
pub trait SourceLoader {
    fn load(&self, artifact: &Path) -> Result<Box<dyn EntrySource>>;
}

/// In-memory entry source with a fixed table.
pub struct StaticEntrySource {
    location: PathBuf,
    entries: Vec<EntryPoint>,
}

impl StaticEntrySource {
    pub fn new(location: impl Into<PathBuf>, entries: Vec<EntryPoint>) -> Self {
        Self {
            location: location.into(),
            entries,
        }
    }
}

impl EntrySource for StaticEntrySource {
    fn location(&self) -> &Path {
        &self.location
    }

    fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_args: &[String]) {}

    #[test]
    fn test_static_source() {
        let source = StaticEntrySource::new(
            "/repo/app.so",
            vec![EntryPoint::new("org.example.Main", "main", noop)],
        );
        assert_eq!(source.location(), Path::new("/repo/app.so"));
        assert_eq!(source.entries().len(), 1);
    }
}
