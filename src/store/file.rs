// src/store/file.rs
// =============================================================================
// Plain-text store under an output directory.
//
//   <dir>/names_<version>.txt      one name per line, sorted, no blank lines
//   <dir>/failures_<version>.txt   "<query>\t<reason>" per failed query
//
// Writes go to a .tmp sibling first and are renamed into place, so a run
// killed mid-write leaves the previous file intact.
// =============================================================================

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::NameStore;
use crate::crawl::FailedQuery;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn names_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("names_{}.txt", version))
    }

    pub fn failures_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("failures_{}.txt", version))
    }

    async fn write_lines<I>(&self, path: &Path, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut contents = String::new();
        for line in lines {
            contents.push_str(&line);
            contents.push('\n');
        }

        let tmp = path.with_extension("txt.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl NameStore for FileStore {
    async fn load_names(&self, version: &str) -> Result<Vec<String>> {
        let path = self.names_path(version);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn save_names(&self, version: &str, names: &BTreeSet<String>) -> Result<()> {
        let path = self.names_path(version);
        self.write_lines(&path, names.iter().cloned()).await?;
        log::debug!("Wrote {} names to {}", names.len(), path.display());
        Ok(())
    }

    async fn save_failures(&self, version: &str, failures: &[FailedQuery]) -> Result<()> {
        let path = self.failures_path(version);
        let lines = failures
            .iter()
            .map(|f| format!("{}\t{}", f.query, f.reason));
        self.write_lines(&path, lines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FailureReason;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load_names("v1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        let names: BTreeSet<String> = ["bob", "alice"].iter().map(|s| s.to_string()).collect();
        store.save_names("v2", &names).await.unwrap();

        let text = std::fs::read_to_string(store.names_path("v2")).unwrap();
        assert_eq!(text, "alice\nbob\n");
        assert_eq!(store.load_names("v2").await.unwrap(), vec!["alice", "bob"]);
        assert!(!store.names_path("v2").with_extension("txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_trims_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.names_path("v1"), "  alice \n\n\nbob\n   \n").unwrap();

        assert_eq!(store.load_names("v1").await.unwrap(), vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_empty_set_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save_names("v1", &BTreeSet::new()).await.unwrap();

        assert_eq!(std::fs::read_to_string(store.names_path("v1")).unwrap(), "");
    }

    #[tokio::test]
    async fn test_failures_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let failures = vec![
            FailedQuery {
                query: "ab".to_string(),
                reason: FailureReason::Status(500),
            },
            FailedQuery {
                query: " a".to_string(),
                reason: FailureReason::RateLimited { attempts: 6 },
            },
        ];
        store.save_failures("v3", &failures).await.unwrap();

        let text = std::fs::read_to_string(store.failures_path("v3")).unwrap();
        assert_eq!(text, "ab\tHTTP 500\n a\trate limited after 6 attempts\n");
    }
}
