use serde::{Deserialize, Serialize};

/// A development task submitted for deliberation.
///
/// Immutable for the lifetime of a debate — nothing in the orchestrator
/// mutates a `Task` once `Orchestrator::debate` has been called with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub context: String,
    pub files: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            context: String::new(),
            files: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// File extensions present across `files`, lower-cased, without the dot.
    pub fn file_extensions(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| f.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .collect()
    }
}
