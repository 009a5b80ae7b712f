//! Binary interface between the launcher and launchable components.
//!
//! A component artifact is a dynamic library exporting three symbols: an ABI
//! version, an entry table and an optional embedded manifest. The
//! [`export_component!`](crate::export_component) macro emits all three.

use serde::{Deserialize, Serialize};

/// Current ABI revision. Bumped whenever [`EntryPoint`] or
/// [`ComponentManifest`] change shape.
pub const ABI_VERSION: u32 = 1;

/// Exported `u32` holding the ABI version the component was built against.
pub const ABI_VERSION_SYMBOL: &[u8] = b"launchpad_abi_version\0";

/// Exported `fn() -> Vec<EntryPoint>` listing the component's entries.
pub const ENTRY_TABLE_SYMBOL: &[u8] = b"launchpad_entry_table\0";

/// Exported `fn() -> ComponentManifest`, optional.
pub const MANIFEST_SYMBOL: &[u8] = b"launchpad_manifest\0";

/// Shape of every invokable entry: one slice of string arguments, no return
/// value. A component that wants to stop the process calls
/// [`request_exit`](crate::exit::request_exit) instead of returning a code.
pub type EntryFn = fn(&[String]);

/// One named entry inside a component's entry table.
#[derive(Clone)]
pub struct EntryPoint {
    pub type_name: String,
    pub method_name: String,
    /// Non-public entries stay listed for diagnostics but refuse invocation.
    pub public: bool,
    pub func: EntryFn,
}

impl EntryPoint {
    pub fn new(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        func: EntryFn,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            public: true,
            func,
        }
    }

    /// An entry that is listed but not invokable from outside its component.
    pub fn internal(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        func: EntryFn,
    ) -> Self {
        Self {
            public: false,
            ..Self::new(type_name, method_name, func)
        }
    }

    pub fn matches_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

impl std::fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoint")
            .field("type_name", &self.type_name)
            .field("method_name", &self.method_name)
            .field("public", &self.public)
            .finish()
    }
}

/// Metadata embedded in a component artifact. The `entry_type` attribute
/// names the default entry type used when the launcher gets no explicit
/// override, mirroring a main-class manifest attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ComponentManifest {
    pub fn with_entry_type(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: Some(entry_type.into()),
            version: None,
        }
    }
}

/// Emit the exported symbols that make a cdylib crate launchable.
///
/// ```ignore
/// launchpad::export_component! {
///     manifest: launchpad::runtime::abi::ComponentManifest::with_entry_type("org.example.Main"),
///     entries: [
///         launchpad::runtime::abi::EntryPoint::new("org.example.Main", "main", my_main),
///     ],
/// }
/// ```
#[macro_export]
macro_rules! export_component {
    (manifest: $manifest:expr, entries: [$($entry:expr),* $(,)?] $(,)?) => {
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static launchpad_abi_version: u32 = $crate::runtime::abi::ABI_VERSION;

        #[no_mangle]
        pub fn launchpad_entry_table() -> Vec<$crate::runtime::abi::EntryPoint> {
            vec![$($entry),*]
        }

        #[no_mangle]
        pub fn launchpad_manifest() -> $crate::runtime::abi::ComponentManifest {
            $manifest
        }
    };
}
