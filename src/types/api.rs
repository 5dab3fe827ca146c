use super::blog::BlogResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    pub topic: String,
    /// Reference date for research, formatted `YYYY-MM-DD`.
    pub as_of: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    Progress {
        node: String,
        #[serde(default)]
        data: ProgressData,
    },
    Complete {
        data: Box<BlogResult>,
    },
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

/// Loose progress payload emitted by pipeline nodes.
///
/// Every field is optional; a node only reports what it knows. Keys the client
/// does not model are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_research: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_planned: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections_done: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_sections: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_planned: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressData {
    /// Merge `newer` over `self`: keys present in `newer` win, absent keys keep
    /// their previous value.
    pub fn merge(&mut self, newer: &ProgressData) {
        fn take<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
            if let Some(value) = newer {
                *slot = Some(value.clone());
            }
        }

        take(&mut self.mode, &newer.mode);
        take(&mut self.needs_research, &newer.needs_research);
        take(&mut self.queries, &newer.queries);
        take(&mut self.evidence_count, &newer.evidence_count);
        take(&mut self.tasks_planned, &newer.tasks_planned);
        take(&mut self.sections_done, &newer.sections_done);
        take(&mut self.total_sections, &newer.total_sections);
        take(&mut self.images_planned, &newer.images_planned);
        take(&mut self.current_step, &newer.current_step);
        for (key, value) in &newer.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}
