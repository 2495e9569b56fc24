//! Tool registry - persisted tool definitions

use std::path::Path;
use toolstore::{JsonStore, StoreError};
use tracing::debug;

use crate::tool::ToolDefinition;

/// The registered tools, backed by one JSON file
pub struct ToolRegistry {
    store: JsonStore<ToolDefinition>,
}

impl ToolRegistry {
    /// Open the registry at the given file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            store: JsonStore::open(path)?,
        })
    }

    /// All registered tools, in registration order
    pub fn list(&self) -> Result<Vec<ToolDefinition>, StoreError> {
        self.store.read_all()
    }

    /// Look up one tool by id
    pub fn get(&self, id: &str) -> Result<Option<ToolDefinition>, StoreError> {
        Ok(self.store.read_all()?.into_iter().find(|t| t.id == id))
    }

    /// Register a new tool
    pub fn add(&self, tool: ToolDefinition) -> Result<(), StoreError> {
        debug!(id = %tool.id, name = %tool.name, "Registering tool");
        self.store.update(|tools| tools.push(tool))
    }

    /// Replace an existing tool by id; returns false when the id is unknown
    pub fn update(&self, tool: ToolDefinition) -> Result<bool, StoreError> {
        self.store.update(|tools| match tools.iter_mut().find(|t| t.id == tool.id) {
            Some(slot) => {
                *slot = tool;
                true
            }
            None => false,
        })
    }

    /// Remove a tool, returning its definition when it existed
    pub fn remove(&self, id: &str) -> Result<Option<ToolDefinition>, StoreError> {
        self.store.update(|tools| {
            let index = tools.iter().position(|t| t.id == id)?;
            Some(tools.remove(index))
        })
    }
}
