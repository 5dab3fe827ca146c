use super::toast::ToastLevel;
use crate::api::GenerationUpdate;
use crate::types::{BlogResult, ProgressData, SseEvent};
use chrono::{DateTime, Utc};

pub const STATUS_READY: &str = "Ready";
pub const STATUS_INITIALIZING: &str = "Initializing generation...";
pub const STATUS_COMPLETE: &str = "Generation complete!";
pub const STATUS_ERROR: &str = "Error generating blog";
pub const STATUS_FINISHED: &str = "Generation finished.";
pub const STATUS_CONNECTION_ERROR: &str = "Connection error";

pub const LOG_STARTED: &str = "Starting generation process";
pub const LOG_COMPLETED: &str = "Generation successfully completed.";
const LOG_PROCESSING: &str = "Processing...";
const SYSTEM_NODE: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStage {
    pub node: &'static str,
    pub label: &'static str,
}

/// Backend pipeline nodes in execution order.
pub const PIPELINE_STAGES: [PipelineStage; 5] = [
    PipelineStage { node: "router", label: "Router" },
    PipelineStage { node: "research", label: "Research" },
    PipelineStage { node: "orchestrator", label: "Planner" },
    PipelineStage { node: "worker", label: "Writers" },
    PipelineStage { node: "reducer", label: "Reducer" },
];

pub fn stage_index(node: &str) -> Option<usize> {
    PIPELINE_STAGES.iter().position(|stage| stage.node == node)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Current,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub node: String,
    pub message: String,
}

impl LogEntry {
    fn now(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.starts_with("Error:")
    }

    pub fn is_completion(&self) -> bool {
        self.message == LOG_COMPLETED
    }
}

/// Side effects a transition asks the surrounding app to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEffect {
    /// Make this the current blog and switch to its view.
    OpenBlog(Box<BlogResult>),
    Notify { level: ToastLevel, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub is_generating: bool,
    pub status_text: String,
    /// Percentage, 0..=100.
    pub progress: f64,
    pub current_node: String,
    pub data: ProgressData,
    pub logs: Vec<LogEntry>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            is_generating: false,
            status_text: STATUS_READY.to_string(),
            progress: 0.0,
            current_node: String::new(),
            data: ProgressData::default(),
            logs: Vec::new(),
        }
    }
}

impl GenerationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn begin(&mut self) {
        *self = Self {
            is_generating: true,
            status_text: STATUS_INITIALIZING.to_string(),
            logs: vec![LogEntry::now(SYSTEM_NODE, LOG_STARTED)],
            ..Self::default()
        };
    }

    pub fn apply(&mut self, update: GenerationUpdate) -> Vec<GenerationEffect> {
        match update {
            GenerationUpdate::Event(event) => self.apply_event(event),
            GenerationUpdate::Finished => {
                self.on_stream_finished();
                Vec::new()
            }
            GenerationUpdate::Failed(message) => self.on_connection_error(&message),
        }
    }

    pub fn apply_event(&mut self, event: SseEvent) -> Vec<GenerationEffect> {
        match event {
            SseEvent::Progress { node, data } => {
                if let Some(step) = &data.current_step {
                    self.status_text = step.clone();
                }
                self.data.merge(&data);
                if let Some(index) = stage_index(&node) {
                    self.progress = (index + 1) as f64 / PIPELINE_STAGES.len() as f64 * 100.0;
                }
                let message = data
                    .current_step
                    .clone()
                    .unwrap_or_else(|| LOG_PROCESSING.to_string());
                self.logs.push(LogEntry::now(node.clone(), message));
                self.current_node = node;
                Vec::new()
            }
            SseEvent::Complete { data } => {
                self.is_generating = false;
                self.progress = 100.0;
                self.status_text = STATUS_COMPLETE.to_string();
                self.logs.push(LogEntry::now(SYSTEM_NODE, LOG_COMPLETED));
                tracing::info!(blog_id = %data.id, "generation complete");
                vec![
                    GenerationEffect::OpenBlog(data),
                    GenerationEffect::Notify {
                        level: ToastLevel::Success,
                        message: "Blog generated successfully!".to_string(),
                    },
                ]
            }
            SseEvent::Error { message } => {
                self.is_generating = false;
                self.status_text = STATUS_ERROR.to_string();
                self.logs
                    .push(LogEntry::now(SYSTEM_NODE, format!("Error: {message}")));
                tracing::warn!(%message, "backend reported a generation error");
                vec![GenerationEffect::Notify {
                    level: ToastLevel::Error,
                    message: format!("Generation failed: {message}"),
                }]
            }
            SseEvent::Unknown => Vec::new(),
        }
    }

    /// The body ended. Only meaningful if no terminal frame arrived first.
    pub fn on_stream_finished(&mut self) {
        if !self.is_generating {
            return;
        }
        self.is_generating = false;
        if self.status_text != STATUS_ERROR {
            self.status_text = STATUS_FINISHED.to_string();
        }
    }

    pub fn on_connection_error(&mut self, message: &str) -> Vec<GenerationEffect> {
        self.is_generating = false;
        self.status_text = STATUS_CONNECTION_ERROR.to_string();
        let text = format!("Connection error: {message}");
        self.logs.push(LogEntry::now(SYSTEM_NODE, text.clone()));
        vec![GenerationEffect::Notify {
            level: ToastLevel::Error,
            message: text,
        }]
    }

    pub fn stage_status(&self, index: usize) -> StageStatus {
        match stage_index(&self.current_node) {
            None => {
                if !self.is_generating && self.status_text == STATUS_COMPLETE {
                    StageStatus::Complete
                } else if index == 0 && self.is_generating {
                    StageStatus::Current
                } else {
                    StageStatus::Pending
                }
            }
            Some(current) if index < current => StageStatus::Complete,
            Some(current) if index == current => StageStatus::Current,
            Some(_) => StageStatus::Pending,
        }
    }

    /// `(done, total, percent)` once writers report a section total. The
    /// percentage never drops below 2 so the bar stays visible.
    pub fn section_progress(&self) -> Option<(u64, u64, f64)> {
        let total = self.data.total_sections.filter(|total| *total > 0)?;
        let done = self.data.sections_done.unwrap_or(0);
        let percent = (done as f64 / total as f64 * 100.0).max(2.0);
        Some((done, total, percent))
    }

    /// The latest step, when it differs from the headline status.
    pub fn secondary_step(&self) -> Option<&str> {
        self.data
            .current_step
            .as_deref()
            .filter(|step| *step != self.status_text)
    }
}
