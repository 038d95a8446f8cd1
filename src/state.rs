use crate::config::{PayrollRules, WriteGuard};
use crate::store::Stores;
#[cfg(test)]
use crate::{model::department::Department, store::memory::MemoryStore};

/// Shared by every handler through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub rules: PayrollRules,
    pub write_guard: WriteGuard,
}

impl AppState {
    pub fn new(stores: Stores, rules: PayrollRules, write_guard: WriteGuard) -> Self {
        Self {
            stores,
            rules,
            write_guard,
        }
    }

    /// State over a fresh in-memory store.
    #[cfg(test)]
    pub fn in_memory(
        departments: Vec<Department>,
        rules: PayrollRules,
        write_guard: WriteGuard,
    ) -> Self {
        Self::new(
            MemoryStore::with_departments(departments).stores(),
            rules,
            write_guard,
        )
    }
}
