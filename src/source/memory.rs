//! In-memory repository used by tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{RemoteFile, SourceControl, SourceError};

/// One recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(String),
    Create(String),
    Update { path: String, sha: String },
}

/// Repository held in memory, with content hashes that change on every write
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, (String, String)>>,
    calls: Mutex<Vec<Call>>,
    revision: Mutex<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, returning its hash
    pub fn insert(&self, path: &str, content: &str) -> String {
        let sha = self.next_sha();
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (content.to_string(), sha.clone()));
        sha
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).map(|(c, _)| c.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn next_sha(&self) -> String {
        let mut revision = self.revision.lock().unwrap();
        *revision += 1;
        format!("sha-{}", *revision)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SourceControl for MemoryStore {
    async fn read(&self, path: &str) -> Result<RemoteFile, SourceError> {
        self.record(Call::Read(path.to_string()));
        Ok(match self.files.lock().unwrap().get(path) {
            Some((content, sha)) => RemoteFile::Found {
                content: content.clone(),
                sha: sha.clone(),
            },
            None => RemoteFile::NotFound,
        })
    }

    async fn create(&self, path: &str, content: &str, _message: &str) -> Result<(), SourceError> {
        self.record(Call::Create(path.to_string()));
        if self.files.lock().unwrap().contains_key(path) {
            return Err(SourceError::Conflict {
                path: path.to_string(),
                message: "already exists".to_string(),
            });
        }
        self.insert(path, content);
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        content: &str,
        _message: &str,
        sha: &str,
    ) -> Result<(), SourceError> {
        self.record(Call::Update {
            path: path.to_string(),
            sha: sha.to_string(),
        });
        let current = self.files.lock().unwrap().get(path).map(|(_, s)| s.clone());
        if current.as_deref() != Some(sha) {
            return Err(SourceError::Conflict {
                path: path.to_string(),
                message: format!("{} does not match {}", path, sha),
            });
        }
        self.insert(path, content);
        Ok(())
    }
}
