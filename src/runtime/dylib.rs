//! Dynamic-library entry sources.
//!
//! Loads a component artifact with `libloading`, verifies its ABI version
//! and reads its entry table. The `Library` stays alive inside the source:
//! the entry table's function pointers are only valid while it is.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::debug;

use crate::core::errors::{LaunchError, Result};
use crate::resolve::ManifestReader;
use crate::runtime::abi::{
    ComponentManifest, EntryPoint, ABI_VERSION, ABI_VERSION_SYMBOL, ENTRY_TABLE_SYMBOL,
    MANIFEST_SYMBOL,
};
use crate::runtime::source::{EntrySource, SourceLoader};

fn symbol_name(symbol: &[u8]) -> String {
    String::from_utf8_lossy(&symbol[..symbol.len() - 1]).into_owned()
}

/// An entry source backed by a loaded dynamic library.
#[derive(Debug)]
pub struct DylibEntrySource {
    path: PathBuf,
    entries: Vec<EntryPoint>,
    _library: Library,
}

impl DylibEntrySource {
    /// Load `path` and read its entry table.
    ///
    /// The ABI version export is optional; when present it must match
    /// [`ABI_VERSION`]. The entry table export is mandatory.
    pub fn open(path: &Path) -> Result<Self> {
        unsafe {
            let library = Library::new(path)
                .map_err(|e| LaunchError::library_load(path, e))?;

            if let Ok(version) = library.get::<*const u32>(ABI_VERSION_SYMBOL) {
                let found = **version;
                if found != ABI_VERSION {
                    return Err(LaunchError::AbiVersionMismatch {
                        path: path.to_path_buf(),
                        expected: ABI_VERSION,
                        found,
                    });
                }
            }

            let table = library
                .get::<fn() -> Vec<EntryPoint>>(ENTRY_TABLE_SYMBOL)
                .map_err(|_| LaunchError::MissingExport {
                    path: path.to_path_buf(),
                    symbol: symbol_name(ENTRY_TABLE_SYMBOL),
                })?;
            let entries = table();
            debug!(path = %path.display(), entries = entries.len(), "loaded component library");

            Ok(Self {
                path: path.to_path_buf(),
                entries,
                _library: library,
            })
        }
    }
}

impl EntrySource for DylibEntrySource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }
}

/// Production [`SourceLoader`]: every load-path artifact is a dylib.
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibSourceLoader;

impl SourceLoader for DylibSourceLoader {
    fn load(&self, artifact: &Path) -> Result<Box<dyn EntrySource>> {
        Ok(Box::new(DylibEntrySource::open(artifact)?))
    }
}

/// Reads the embedded manifest of a dylib artifact.
///
/// A library without the manifest export simply has no manifest; a library
/// that cannot be loaded at all is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibManifestReader;

impl ManifestReader for DylibManifestReader {
    fn read_entry_type(&self, artifact: &Path) -> Result<Option<String>> {
        unsafe {
            let library = Library::new(artifact)
                .map_err(|e| LaunchError::library_load(artifact, e))?;
            match library.get::<fn() -> ComponentManifest>(MANIFEST_SYMBOL) {
                Ok(manifest) => Ok(manifest().entry_type),
                Err(_) => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_name_strips_nul() {
        assert_eq!(symbol_name(ENTRY_TABLE_SYMBOL), "launchpad_entry_table");
    }

    #[test]
    fn test_open_missing_file_is_library_load_error() {
        let err = DylibEntrySource::open(Path::new("/nonexistent/lib.so")).unwrap_err();
        assert!(matches!(err, LaunchError::LibraryLoad { .. }));
    }

    #[test]
    fn test_manifest_reader_missing_file_is_library_load_error() {
        let err = DylibManifestReader
            .read_entry_type(Path::new("/nonexistent/lib.so"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::LibraryLoad { .. }));
    }
}
