//! Persistence seam for series data (history entries, ratio points).

mod file;
#[cfg(test)]
mod memory;

pub use file::JsonFileStore;
#[cfg(test)]
pub use memory::MemoryStore;

use crate::errors::Result;

/// Wholesale load/save of an ordered series. Implementations replace the
/// stored series on every save; there is no partial update.
pub trait SeriesStore<T>: Send + Sync {
    /// Load the full series. A store with nothing persisted yet returns
    /// an empty vector, not an error.
    fn load(&self) -> Result<Vec<T>>;

    /// Replace the persisted series with `items`.
    fn save(&self, items: &[T]) -> Result<()>;
}
