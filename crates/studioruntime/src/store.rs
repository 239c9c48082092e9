use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Missing {0}")]
    MissingField(&'static str),
}

/// A named workflow document owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWorkflow {
    pub id: Uuid,
    pub name: String,
    pub data: serde_json::Value,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence used by the request layer around execution
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn save(
        &self,
        owner: &str,
        name: &str,
        data: serde_json::Value,
    ) -> Result<SavedWorkflow, StoreError>;

    /// Workflows owned by `owner`, most recently updated first
    async fn list(&self, owner: &str) -> Result<Vec<SavedWorkflow>, StoreError>;
}

/// Process-local store
#[derive(Default)]
pub struct MemoryWorkflowStore {
    workflows: RwLock<Vec<SavedWorkflow>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn save(
        &self,
        owner: &str,
        name: &str,
        data: serde_json::Value,
    ) -> Result<SavedWorkflow, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::MissingField("name"));
        }
        if data.is_null() {
            return Err(StoreError::MissingField("data"));
        }

        let now = Utc::now();
        let saved = SavedWorkflow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            data,
            owner: owner.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.workflows.write().await.push(saved.clone());
        tracing::info!("Saved workflow '{}' ({}) for {}", saved.name, saved.id, owner);

        Ok(saved)
    }

    async fn list(&self, owner: &str) -> Result<Vec<SavedWorkflow>, StoreError> {
        let workflows = self.workflows.read().await;
        // Later saves win ties on updated_at.
        let mut owned: Vec<SavedWorkflow> = workflows
            .iter()
            .rev()
            .filter(|w| w.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lists_only_owned_workflows_newest_first() {
        let store = MemoryWorkflowStore::new();
        store.save("ada@example.com", "first", json!({"nodes": []})).await.unwrap();
        store.save("bob@example.com", "other", json!({"nodes": []})).await.unwrap();
        store.save("ada@example.com", "second", json!({"nodes": []})).await.unwrap();

        let names: Vec<String> = store
            .list("ada@example.com")
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();

        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn rejects_missing_name_or_data() {
        let store = MemoryWorkflowStore::new();

        assert_eq!(
            store.save("ada@example.com", " ", json!({})).await.unwrap_err(),
            StoreError::MissingField("name")
        );
        assert_eq!(
            store.save("ada@example.com", "x", serde_json::Value::Null).await.unwrap_err(),
            StoreError::MissingField("data")
        );
        assert!(store.list("ada@example.com").await.unwrap().is_empty());
    }
}
