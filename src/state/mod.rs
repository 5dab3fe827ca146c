mod app;
mod generation;
mod toast;

pub use app::{AppAction, AppState, Route};
pub use generation::{
    stage_index, GenerationEffect, GenerationState, LogEntry, PipelineStage, StageStatus,
    PIPELINE_STAGES, STATUS_COMPLETE, STATUS_CONNECTION_ERROR, STATUS_ERROR, STATUS_FINISHED,
    STATUS_INITIALIZING, STATUS_READY,
};
pub use toast::{Toast, ToastLevel, ToastQueue};
