use std::cell::OnceCell;

/// A relation collection that is hydrated at most once
///
/// A parent record starts either unloaded (plain get/list) or already loaded
/// (eager query). The first successful lazy load fills the cell; after that
/// the cached children are returned on every access, even if the store has
/// changed since. Callers that need fresh children re-fetch the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation<T> {
    cell: OnceCell<Vec<T>>,
}

impl<T> Relation<T> {
    /// Relation that has not been hydrated yet
    pub fn not_loaded() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Relation hydrated up front, e.g. from an aggregate query
    pub fn loaded(items: Vec<T>) -> Self {
        Self {
            cell: OnceCell::from(items),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Cached children, or `None` if the relation was never hydrated
    pub fn get(&self) -> Option<&[T]> {
        self.cell.get().map(Vec::as_slice)
    }

    /// Return the cached children, running `load` only if none are cached
    ///
    /// A failed load leaves the relation unloaded, so a later call retries.
    pub fn get_or_try_load<E, F>(&self, load: F) -> Result<&[T], E>
    where
        F: FnOnce() -> Result<Vec<T>, E>,
    {
        if let Some(items) = self.cell.get() {
            return Ok(items);
        }
        let items = load()?;
        Ok(self.cell.get_or_init(|| items))
    }
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Self::not_loaded()
    }
}
