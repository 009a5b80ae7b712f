//! Isolated execution runtime: component ABI, entry sources, host registry
//! and the execution context that ties them together.

pub mod abi;
pub mod context;
pub mod dylib;
pub mod registry;
pub mod source;

pub use abi::{ComponentManifest, EntryFn, EntryPoint, ABI_VERSION};
pub use context::{EntryHandle, ExecutionContext, InvocationOutcome};
pub use dylib::{DylibEntrySource, DylibManifestReader, DylibSourceLoader};
pub use registry::EntryRegistry;
pub use source::{EntrySource, SourceLoader, StaticEntrySource};
