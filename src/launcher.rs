//! Launch orchestration.
//!
//! [`Launcher::run`] drives one launch end to end: parse the coordinate,
//! load project metadata, resolve the dependency graph under the scope
//! policy, resolve the root artifact, assemble the load path, pick the
//! entry type, then invoke inside an armed exit interceptor with property
//! overrides applied. Interception and property state are released by RAII
//! guards on every path out, so the caller always gets back a process in
//! normal termination semantics.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::coordinate::Coordinate;
use crate::core::errors::{LaunchError, Result};
use crate::core::props::PropertyGuard;
use crate::exit::ExitInterceptor;
use crate::graph::{loadpath, ScopePolicy};
use crate::resolve::repository::LocalRepository;
use crate::resolve::{ArtifactResolver, GraphResolver, ManifestReader, ProjectLoader};
use crate::runtime::{
    DylibManifestReader, DylibSourceLoader, EntryRegistry, ExecutionContext, InvocationOutcome,
    SourceLoader,
};

pub const DEFAULT_ENTRY_METHOD: &str = "main";

/// What to invoke once the component is resolved. Built once per launch and
/// not consulted again after invocation starts.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Entry type to execute; when absent the root artifact's embedded
    /// manifest must name one.
    pub entry_type: Option<String>,
    pub entry_method: String,
    pub arguments: Vec<String>,
    /// Runtime-property overrides, applied for the duration of the launch.
    pub properties: HashMap<String, String>,
}

impl Default for InvocationRequest {
    fn default() -> Self {
        Self {
            entry_type: None,
            entry_method: DEFAULT_ENTRY_METHOD.to_string(),
            arguments: Vec::new(),
            properties: HashMap::new(),
        }
    }
}

impl InvocationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_type(mut self, entry_type: impl Into<String>) -> Self {
        self.entry_type = Some(entry_type.into());
        self
    }

    pub fn with_entry_method(mut self, entry_method: impl Into<String>) -> Self {
        self.entry_method = entry_method.into();
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Resolves, assembles and runs one component per [`run`](Launcher::run).
pub struct Launcher {
    projects: Arc<dyn ProjectLoader>,
    graphs: Arc<dyn GraphResolver>,
    artifacts: Arc<dyn ArtifactResolver>,
    manifests: Arc<dyn ManifestReader>,
    sources: Arc<dyn SourceLoader>,
    host: EntryRegistry,
    scope_policy: ScopePolicy,
}

impl Launcher {
    pub fn new(
        projects: Arc<dyn ProjectLoader>,
        graphs: Arc<dyn GraphResolver>,
        artifacts: Arc<dyn ArtifactResolver>,
        manifests: Arc<dyn ManifestReader>,
        sources: Arc<dyn SourceLoader>,
    ) -> Self {
        Self {
            projects,
            graphs,
            artifacts,
            manifests,
            sources,
            host: EntryRegistry::new(),
            scope_policy: ScopePolicy::default(),
        }
    }

    /// Wire a launcher around a local repository with the dylib runtime.
    pub fn with_repository(repository: LocalRepository) -> Self {
        let repository = Arc::new(repository);
        Self::new(
            repository.clone(),
            repository.clone(),
            repository,
            Arc::new(DylibManifestReader),
            Arc::new(DylibSourceLoader),
        )
    }

    pub fn with_host_registry(mut self, host: EntryRegistry) -> Self {
        self.host = host;
        self
    }

    pub fn with_scope_policy(mut self, scope_policy: ScopePolicy) -> Self {
        self.scope_policy = scope_policy;
        self
    }

    pub fn host_registry(&self) -> &EntryRegistry {
        &self.host
    }

    /// Launch `coordinate` and return the component's exit status.
    ///
    /// Normal return of the entry maps to 0; a requested exit maps to its
    /// status; every other failure is an error. Whether the returned status
    /// terminates the real process is the caller's decision; by the time
    /// this returns, exit requests are no longer intercepted.
    pub fn run(&self, coordinate: &str, request: &InvocationRequest) -> Result<i32> {
        let coordinate: Coordinate = coordinate.parse()?;
        info!(coordinate = %coordinate, "launching component");

        let project = self.projects.load(&coordinate)?;

        debug!("resolving dependency graph");
        let graph = self.graphs.resolve(&project, &self.scope_policy)?;

        let root_artifact = self.artifacts.resolve_file(&coordinate)?;
        debug!(artifact = %root_artifact.display(), "root artifact resolved");

        let load_path = loadpath::assemble(&coordinate, &root_artifact, &graph)?;

        let entry_type = match &request.entry_type {
            Some(explicit) => explicit.clone(),
            None => self
                .manifests
                .read_entry_type(&root_artifact)?
                .ok_or_else(|| LaunchError::EntryNotSpecified(root_artifact.clone()))?,
        };
        debug!(entry_type = %entry_type, entry_method = %request.entry_method, "entry point selected");

        let _properties = PropertyGuard::apply(&request.properties);
        let _interception = ExitInterceptor::global().arm();

        let context =
            ExecutionContext::from_load_path(&load_path, self.sources.as_ref(), self.host.clone())?;
        let handle = context.load_entry(&entry_type, &request.entry_method)?;

        let status = match context.invoke(&handle, &request.arguments)? {
            InvocationOutcome::Completed => 0,
            InvocationOutcome::ExitRequested(status) => {
                debug!(status, "component requested exit");
                status
            }
        };

        info!(status, "launch finished");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = InvocationRequest::new();
        assert_eq!(request.entry_method, "main");
        assert!(request.entry_type.is_none());
        assert!(request.arguments.is_empty());
        assert!(request.properties.is_empty());
    }

    #[test]
    fn test_request_builders() {
        let request = InvocationRequest::new()
            .with_entry_type("org.example.Main")
            .with_entry_method("start")
            .with_arguments(vec!["a".into(), "b".into()])
            .with_property("color", "blue");
        assert_eq!(request.entry_type.as_deref(), Some("org.example.Main"));
        assert_eq!(request.entry_method, "start");
        assert_eq!(request.arguments.len(), 2);
        assert_eq!(request.properties.get("color").map(String::as_str), Some("blue"));
    }
}
