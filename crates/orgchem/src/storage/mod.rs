//! Key/value storage backends for UI flags
//!
//! Each key has exactly one owning component: `sidebarCollapsed` belongs to
//! the sidebar controller, `theme` and `fontSize` to the theme controller.
//! Everyone else goes through those owners.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Trait for string key/value stores
///
/// Writes are best effort: a backend that cannot persist logs the failure
/// and carries on, the way browser storage quota errors are handled.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);

    fn remove(&self, key: &str);

    /// Get storage backend name
    fn name(&self) -> &'static str;
}
