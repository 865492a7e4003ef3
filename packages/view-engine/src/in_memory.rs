//! In-memory `ClusterRepository`, grounded in the teacher's
//! `storage::engines::hashmap` backend: a `parking_lot::RwLock`-guarded map
//! standing in for the content repository, useful both as a test double and
//! as an embeddable backend for a single-process deployment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use clusterview_core::{ClusterIdRecord, ClusterViewError, Descriptor};
use parking_lot::RwLock;

use crate::repository::{ClusterRepository, CommitOutcome, RawMemberNode, RepositorySession};

#[derive(Debug, Default)]
struct Data {
    descriptor: Option<Descriptor>,
    nodes: HashMap<String, RawMemberNode>,
    properties: HashMap<String, HashMap<String, String>>,
    cluster_id: Option<ClusterIdRecord>,
}

/// Shared in-memory backing store. Cloning a `ClusterRepository` built from
/// this handle yields independent sessions over the same data, matching the
/// teacher's pattern of one lightweight session type per `open_session`
/// call over a shared engine.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    data: Arc<RwLock<Data>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_descriptor(&self, descriptor: Descriptor) {
        self.data.write().descriptor = Some(descriptor);
    }

    pub fn put_member_node(&self, stable_id: impl Into<String>, node: RawMemberNode) {
        self.data.write().nodes.insert(stable_id.into(), node);
    }

    pub fn put_member_properties(
        &self,
        stable_id: impl Into<String>,
        properties: HashMap<String, String>,
    ) {
        self.data
            .write()
            .properties
            .insert(stable_id.into(), properties);
    }

    pub fn remove_member(&self, stable_id: &str) {
        let mut data = self.data.write();
        data.nodes.remove(stable_id);
        data.properties.remove(stable_id);
    }
}

struct InMemorySession {
    data: Arc<RwLock<Data>>,
}

#[async_trait]
impl ClusterRepository for InMemoryRepository {
    async fn open_session(&self) -> Result<Box<dyn RepositorySession>, ClusterViewError> {
        Ok(Box::new(InMemorySession {
            data: Arc::clone(&self.data),
        }))
    }
}

#[async_trait]
impl RepositorySession for InMemorySession {
    async fn read_descriptor(&self) -> Result<Descriptor, ClusterViewError> {
        self.data
            .read()
            .descriptor
            .clone()
            .ok_or_else(|| ClusterViewError::repository("no descriptor has been published"))
    }

    async fn read_member_node(
        &self,
        stable_id: &str,
    ) -> Result<Option<RawMemberNode>, ClusterViewError> {
        Ok(self.data.read().nodes.get(stable_id).cloned())
    }

    async fn read_member_properties(
        &self,
        stable_id: &str,
    ) -> Result<HashMap<String, String>, ClusterViewError> {
        Ok(self
            .data
            .read()
            .properties
            .get(stable_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_cluster_id_record(&self) -> Result<Option<ClusterIdRecord>, ClusterViewError> {
        Ok(self.data.read().cluster_id.clone())
    }

    async fn try_define_cluster_id(
        &self,
        record: &ClusterIdRecord,
    ) -> Result<CommitOutcome, ClusterViewError> {
        let mut data = self.data.write();
        if data.cluster_id.is_some() {
            return Ok(CommitOutcome::Conflict);
        }
        data.cluster_id = Some(record.clone());
        Ok(CommitOutcome::Committed)
    }
}
