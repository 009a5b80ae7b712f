//! Isolated execution contexts.
//!
//! A context owns the entry sources loaded from a load path and resolves
//! entry lookups against them first, falling back to the host registry only
//! when no source defines the requested type. Lookup follows load-path
//! precedence: the first source that defines a type owns it outright; a
//! later source cannot supply a method the owning source lacks.

use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, trace};

use crate::core::errors::{LaunchError, Result};
use crate::exit::ExitSignal;
use crate::graph::loadpath::LoadPath;
use crate::runtime::abi::{EntryFn, EntryPoint};
use crate::runtime::registry::EntryRegistry;
use crate::runtime::source::{EntrySource, SourceLoader};

/// How an invocation ended, when it did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The entry returned normally.
    Completed,
    /// The entry asked to terminate the process with this status.
    ExitRequested(i32),
}

/// A resolved, invokable entry. Borrowed from the context so the handle can
/// never outlive the libraries its function pointer lives in.
pub struct EntryHandle<'ctx> {
    type_name: String,
    method_name: String,
    public: bool,
    func: EntryFn,
    _context: PhantomData<&'ctx ExecutionContext>,
}

impl EntryHandle<'_> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

/// Sandboxed namespace over an assembled load path.
pub struct ExecutionContext {
    sources: Vec<Box<dyn EntrySource>>,
    host: EntryRegistry,
}

impl ExecutionContext {
    /// Load every artifact on `load_path` into an entry source, in order.
    pub fn from_load_path(
        load_path: &LoadPath,
        loader: &dyn SourceLoader,
        host: EntryRegistry,
    ) -> Result<Self> {
        let mut sources = Vec::with_capacity(load_path.len());
        for artifact in load_path.iter() {
            sources.push(loader.load(artifact)?);
        }
        debug!(sources = sources.len(), "execution context constructed");
        Ok(Self { sources, host })
    }

    /// Build a context from already-loaded sources.
    pub fn from_sources(sources: Vec<Box<dyn EntrySource>>, host: EntryRegistry) -> Self {
        Self { sources, host }
    }

    fn make_handle(&self, entry: &EntryPoint) -> EntryHandle<'_> {
        EntryHandle {
            type_name: entry.type_name.clone(),
            method_name: entry.method_name.clone(),
            public: entry.public,
            func: entry.func,
            _context: PhantomData,
        }
    }

    /// Resolve `type_name::method_name` to an invokable handle.
    ///
    /// Load-path sources are searched in order; the first one defining the
    /// type is authoritative for its methods. The host registry is only
    /// consulted when no source defines the type at all, which is how
    /// host-shared entries remain reachable without being on the load path.
    pub fn load_entry(&self, type_name: &str, method_name: &str) -> Result<EntryHandle<'_>> {
        for source in &self.sources {
            let mut in_type = source
                .entries()
                .iter()
                .filter(|entry| entry.matches_type(type_name))
                .peekable();
            if in_type.peek().is_none() {
                continue;
            }
            trace!(
                type_name,
                source = %source.location().display(),
                "entry type found on load path"
            );
            return in_type
                .find(|entry| entry.method_name == method_name)
                .map(|entry| self.make_handle(entry))
                .ok_or_else(|| LaunchError::MethodNotFound {
                    type_name: type_name.to_string(),
                    method_name: method_name.to_string(),
                });
        }

        if let Some(entries) = self.host.lookup_type(type_name) {
            trace!(type_name, "entry type found in host registry");
            return entries
                .iter()
                .find(|entry| entry.method_name == method_name)
                .map(|entry| self.make_handle(entry))
                .ok_or_else(|| LaunchError::MethodNotFound {
                    type_name: type_name.to_string(),
                    method_name: method_name.to_string(),
                });
        }

        Err(LaunchError::TypeNotFound(type_name.to_string()))
    }

    /// Invoke a loaded entry with `arguments`.
    ///
    /// An [`ExitSignal`] raised by the entry is unwrapped into
    /// [`InvocationOutcome::ExitRequested`]; it is never folded into an
    /// invocation error. Any other failure of the entry becomes
    /// [`LaunchError::Invocation`]. Nothing else is caught.
    pub fn invoke(
        &self,
        handle: &EntryHandle<'_>,
        arguments: &[String],
    ) -> Result<InvocationOutcome> {
        if !handle.public {
            return Err(LaunchError::Access {
                type_name: handle.type_name.clone(),
                method_name: handle.method_name.clone(),
            });
        }

        debug!(
            entry = %format!("{}::{}", handle.type_name, handle.method_name),
            arguments = arguments.len(),
            "invoking entry"
        );
        match catch_unwind(AssertUnwindSafe(|| (handle.func)(arguments))) {
            Ok(()) => Ok(InvocationOutcome::Completed),
            Err(payload) => match payload.downcast::<ExitSignal>() {
                Ok(signal) => Ok(InvocationOutcome::ExitRequested(signal.status)),
                Err(payload) => Err(LaunchError::Invocation {
                    type_name: handle.type_name.clone(),
                    method_name: handle.method_name.clone(),
                    message: panic_message(payload.as_ref()),
                }),
            },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "entry raised a non-message payload".to_string()
    }
}
