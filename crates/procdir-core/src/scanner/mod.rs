pub mod registry;

pub use registry::{scan_registry, ProcessRegistry, RegistryKey};
