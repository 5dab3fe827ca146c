mod api;
mod blog;

pub use api::{GenerateRequest, ProgressData, SseEvent};
pub use blog::{
    BlogKind, BlogPlan, BlogResult, DownloadKind, EvidenceItem, ImageSpec, PastBlog, PlanTask,
};
