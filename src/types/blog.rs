use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogKind {
    Explainer,
    Tutorial,
    NewsRoundup,
    Comparison,
    SystemDesign,
    #[serde(other)]
    Other,
}

impl BlogKind {
    pub fn label(&self) -> &'static str {
        match self {
            BlogKind::Explainer => "explainer",
            BlogKind::Tutorial => "tutorial",
            BlogKind::NewsRoundup => "news roundup",
            BlogKind::Comparison => "comparison",
            BlogKind::SystemDesign => "system design",
            BlogKind::Other => "other",
        }
    }
}

impl fmt::Display for BlogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A finished article as returned by `GET /blogs/:id` or the `complete` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogResult {
    pub id: String,
    pub plan: BlogPlan,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    #[serde(default)]
    pub image_specs: Vec<ImageSpec>,
    pub final_markdown: String,
    pub created_at: String,
}

impl BlogResult {
    pub fn word_count(&self) -> usize {
        self.final_markdown.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPlan {
    pub blog_title: String,
    pub audience: String,
    pub tone: String,
    pub blog_kind: BlogKind,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTask {
    pub id: u32,
    pub title: String,
    pub goal: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    pub target_words: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires_research: bool,
    #[serde(default)]
    pub requires_citations: bool,
    #[serde(default)]
    pub requires_code: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
    pub published_at: Option<String>,
    pub snippet: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub placeholder: String,
    pub filename: String,
    pub alt: String,
    pub caption: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
}

/// Summary row from `GET /blogs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastBlog {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub created_at: String,
    pub word_count: u64,
    pub has_images: bool,
    pub blog_kind: BlogKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadKind {
    Markdown,
    Images,
    Bundle,
}

impl DownloadKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            DownloadKind::Markdown => "markdown",
            DownloadKind::Images => "images",
            DownloadKind::Bundle => "bundle",
        }
    }

    /// Short label shown in notifications.
    pub fn label(self) -> &'static str {
        match self {
            DownloadKind::Markdown => "MD",
            DownloadKind::Images => "IMG",
            DownloadKind::Bundle => "ZIP",
        }
    }

    pub fn fallback_filename(self) -> &'static str {
        match self {
            DownloadKind::Markdown => "download.md",
            DownloadKind::Images | DownloadKind::Bundle => "download.zip",
        }
    }
}
