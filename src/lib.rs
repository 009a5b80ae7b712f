// Core infrastructure modules
pub mod core {
    pub mod errors;
    pub mod props;
}

pub mod coordinate;
pub mod exit;
pub mod graph;
pub mod launcher;
pub mod resolve;
pub mod runtime;

// Re-exports for convenience
pub use crate::core::errors::{LaunchError, Result};
pub use coordinate::Coordinate;
pub use exit::{request_exit, ExitInterceptor, ExitSignal};
pub use graph::loadpath::{assemble, LoadPath};
pub use graph::{DependencyNode, ResolvedGraph, Scope, ScopePolicy};
pub use launcher::{InvocationRequest, Launcher};
pub use resolve::repository::LocalRepository;
pub use runtime::{EntryPoint, EntryRegistry, ExecutionContext, InvocationOutcome};
