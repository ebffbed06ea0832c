use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::SeriesStore;
use crate::errors::{Error, Result};

/// In-memory store for tests. Counts saves and can be told to fail them.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    items: Mutex<Vec<T>>,
    saves: AtomicUsize,
    fail_on_save: AtomicBool,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore {
            items: Mutex::new(Vec::new()),
            saves: AtomicUsize::new(0),
            fail_on_save: AtomicBool::new(false),
        }
    }

    pub fn with_items(items: Vec<T>) -> Self {
        let store = MemoryStore::new();
        *store.items.lock().unwrap() = items;
        store
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub fn items(&self) -> Vec<T> {
        self.items.lock().unwrap().clone()
    }
}

impl<T: Clone + Send + Sync> SeriesStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<Vec<T>> {
        Ok(self.items.lock().unwrap().clone())
    }

    fn save(&self, items: &[T]) -> Result<()> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(Error::Store("simulated save failure".to_string()));
        }
        *self.items.lock().unwrap() = items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
