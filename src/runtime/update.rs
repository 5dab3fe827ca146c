use crate::api::GenerationUpdate;
use crate::types::{BlogResult, DownloadKind, PastBlog};
use std::path::PathBuf;

/// Results of background work, delivered to the mode on the runtime thread.
#[derive(Debug)]
pub enum UiUpdate {
    /// `id` identifies the generation the update belongs to, so anything
    /// still queued from a replaced generation can be dropped.
    Generation { id: u64, update: GenerationUpdate },
    PastBlogsLoaded(Result<Vec<PastBlog>, String>),
    BlogLoaded(Result<Box<BlogResult>, String>),
    DownloadFinished {
        kind: DownloadKind,
        result: Result<PathBuf, String>,
    },
}
