// src/store/mod.rs
// =============================================================================
// Where harvested names are kept between runs.
//
// The coordinator only sees the NameStore trait: load what a previous run
// found, save the current result set, save the failure list. Runs are
// cumulative because the result set is seeded from load_names().
// =============================================================================

mod file;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::crawl::FailedQuery;
use crate::error::Result;

pub use file::FileStore;

#[async_trait]
pub trait NameStore: Send + Sync {
    /// Names persisted by earlier runs for `version` (empty if none)
    async fn load_names(&self, version: &str) -> Result<Vec<String>>;

    /// Replaces the stored names for `version`
    async fn save_names(&self, version: &str, names: &BTreeSet<String>) -> Result<()>;

    /// Replaces the failure log for `version`
    async fn save_failures(&self, version: &str, failures: &[FailedQuery]) -> Result<()>;
}

#[cfg(test)]
pub use memory::MemoryStore;
