use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the entire launchpad library.
///
/// Every variant is fatal to the current launch: nothing is retried
/// internally, the failing stage propagates straight to the caller of
/// [`Launcher::run`](crate::launcher::Launcher::run). A request by the
/// launched component to terminate the process is *not* an error and is
/// carried by [`ExitSignal`](crate::exit::ExitSignal) instead.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid coordinate '{0}': expected exactly three non-empty ':'-separated parts")]
    InvalidCoordinate(String),

    #[error("failed to load project metadata for {coordinate}: {reason}")]
    ProjectLoad { coordinate: String, reason: String },

    #[error("failed to resolve dependency graph for {coordinate}: {reason}")]
    DependencyResolution { coordinate: String, reason: String },

    #[error("dependency cycle detected in the graph of {0}")]
    DependencyCycle(String),

    /// A graph node that is not the root component has no resolved file.
    #[error("failed to resolve dependency: {0}")]
    UnresolvedDependency(String),

    #[error("failed to resolve artifact for {coordinate}: {reason}")]
    ArtifactResolution { coordinate: String, reason: String },

    /// No entry type was supplied and the root artifact's manifest names none.
    #[error("no entry type given and the manifest of {} names none", .0.display())]
    EntryNotSpecified(PathBuf),

    #[error("cannot load library {}: {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("library {} is missing export '{symbol}'", path.display())]
    MissingExport { path: PathBuf, symbol: String },

    #[error("ABI version mismatch in {}: expected {expected}, found {found}", path.display())]
    AbiVersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("entry type not found: {0}")]
    TypeNotFound(String),

    #[error("entry type '{type_name}' has no method '{method_name}' taking a string slice")]
    MethodNotFound {
        type_name: String,
        method_name: String,
    },

    #[error("entry '{type_name}::{method_name}' is not invokable from outside its component")]
    Access {
        type_name: String,
        method_name: String,
    },

    /// The invoked entry point itself failed. Never wraps an exit request.
    #[error("invocation of '{type_name}::{method_name}' failed: {message}")]
    Invocation {
        type_name: String,
        method_name: String,
        message: String,
    },

    #[error("failed to parse descriptor {}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl LaunchError {
    pub fn project_load(coordinate: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProjectLoad {
            coordinate: coordinate.into(),
            reason: reason.to_string(),
        }
    }

    pub fn dependency_resolution(coordinate: impl Into<String>, reason: impl ToString) -> Self {
        Self::DependencyResolution {
            coordinate: coordinate.into(),
            reason: reason.to_string(),
        }
    }

    pub fn artifact_resolution(coordinate: impl Into<String>, reason: impl ToString) -> Self {
        Self::ArtifactResolution {
            coordinate: coordinate.into(),
            reason: reason.to_string(),
        }
    }

    pub fn library_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::LibraryLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The launch stage this error belongs to, for user-facing reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidCoordinate(_) => "coordinate",
            Self::ProjectLoad { .. } => "project",
            Self::DependencyResolution { .. } | Self::DependencyCycle(_) => "graph",
            Self::UnresolvedDependency(_) => "load-path",
            Self::ArtifactResolution { .. } => "artifact",
            Self::EntryNotSpecified(_) => "entry",
            Self::LibraryLoad { .. }
            | Self::MissingExport { .. }
            | Self::AbiVersionMismatch { .. } => "library",
            Self::TypeNotFound(_) | Self::MethodNotFound { .. } => "entry",
            Self::Access { .. } | Self::Invocation { .. } => "invocation",
            Self::Descriptor { .. } => "descriptor",
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        assert_eq!(
            LaunchError::InvalidCoordinate("bad".into()).stage(),
            "coordinate"
        );
        assert_eq!(
            LaunchError::UnresolvedDependency("org:lib:2.0".into()).stage(),
            "load-path"
        );
        assert_eq!(
            LaunchError::Invocation {
                type_name: "t".into(),
                method_name: "m".into(),
                message: "boom".into(),
            }
            .stage(),
            "invocation"
        );
    }

    #[test]
    fn test_display_carries_offending_key() {
        let err = LaunchError::UnresolvedDependency("org:lib:2.0".into());
        assert!(err.to_string().contains("org:lib:2.0"));

        let err = LaunchError::MethodNotFound {
            type_name: "org.example.Main".into(),
            method_name: "main".into(),
        };
        assert!(err.to_string().contains("org.example.Main"));
        assert!(err.to_string().contains("main"));
    }
}
