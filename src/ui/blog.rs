use super::format::{format_date, format_log_time, parse_timestamp};
use super::markdown::markdown_lines;
use crate::state::LogEntry;
use crate::types::{BlogPlan, BlogResult, EvidenceItem};
use chrono::{DateTime, Utc};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use reqwest::Url;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlogTab {
    Plan,
    Evidence,
    Preview,
    Images,
    Logs,
}

impl BlogTab {
    pub const ALL: [BlogTab; 5] = [
        BlogTab::Plan,
        BlogTab::Evidence,
        BlogTab::Preview,
        BlogTab::Images,
        BlogTab::Logs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            BlogTab::Plan => "Plan",
            BlogTab::Evidence => "Evidence",
            BlogTab::Preview => "Preview",
            BlogTab::Images => "Images",
            BlogTab::Logs => "Logs",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn check(value: bool) -> Span<'static> {
    if value {
        Span::styled("✓", Style::default().fg(Color::Green))
    } else {
        Span::styled("✗", dim())
    }
}

pub fn plan_lines(plan: &BlogPlan) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled("MISSION BRIEF", dim()),
        Line::styled(plan.blog_title.clone(), bold().fg(Color::Yellow)),
        Line::from(vec![
            Span::styled("Audience ", dim()),
            Span::raw(plan.audience.clone()),
            Span::styled("   Tone ", dim()),
            Span::raw(plan.tone.clone()),
            Span::styled("   Kind ", dim()),
            Span::raw(plan.blog_kind.label().to_string()),
        ]),
    ];

    if !plan.constraints.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::styled("Constraints", bold()));
        for constraint in &plan.constraints {
            lines.push(Line::from(format!("  • {constraint}")));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(format!("PHASES: {}", plan.tasks.len()), bold()));
    for (i, task) in plan.tasks.iter().enumerate() {
        let tags: Vec<String> = task
            .tags
            .iter()
            .map(|tag| format!("#{}", tag.replacen(' ', "_", 1)))
            .collect();

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("{:02} ", i + 1), dim()),
            Span::styled(task.title.clone(), bold()),
            Span::styled(format!("  {} words", task.target_words), dim()),
        ]));
        if !tags.is_empty() {
            lines.push(Line::styled(format!("   {}", tags.join(" ")), Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(vec![
            Span::raw("   research "),
            check(task.requires_research),
            Span::raw("  citations "),
            check(task.requires_citations),
            Span::raw("  code "),
            check(task.requires_code),
        ]));
        lines.push(Line::from(format!("   > {}", task.goal)));
        for (n, bullet) in task.bullets.iter().enumerate() {
            lines.push(Line::from(format!("     {}. {bullet}", n + 1)));
        }
    }
    lines
}

/// Newest first. Missing or unparsable dates sink to the bottom in their
/// original order.
pub fn sort_evidence(evidence: &[EvidenceItem]) -> Vec<&EvidenceItem> {
    let mut sorted: Vec<(Option<DateTime<Utc>>, &EvidenceItem)> = evidence
        .iter()
        .map(|item| (item.published_at.as_deref().and_then(parse_timestamp), item))
        .collect();
    sorted.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted.into_iter().map(|(_, item)| item).collect()
}

fn source_label(item: &EvidenceItem) -> String {
    if let Some(source) = item.source.as_deref().filter(|s| !s.is_empty()) {
        return source.to_string();
    }
    Url::parse(&item.url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.replacen("www.", "", 1)))
        .unwrap_or_else(|| item.url.clone())
}

pub fn evidence_lines(evidence: &[EvidenceItem], mode: Option<&str>) -> Vec<Line<'static>> {
    if evidence.is_empty() {
        let message = if mode == Some("closed_book") {
            "> Closed-book mode: written from model knowledge, no web sources."
        } else {
            "> No web sources located for this generation."
        };
        return vec![Line::styled(message, dim())];
    }

    let mut lines = vec![Line::styled(
        format!("Knowledge Base  ({} sources)", evidence.len()),
        bold(),
    )];
    for (i, item) in sort_evidence(evidence).into_iter().enumerate() {
        let title = if item.title.is_empty() {
            item.url.clone()
        } else {
            item.title.clone()
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("{:02} ", i + 1), dim()),
            Span::styled(title, bold()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("   {}", source_label(item)), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", format_date(item.published_at.as_deref())), dim()),
        ]));
        lines.push(Line::styled(format!("   {}", item.url), dim()));
        if let Some(snippet) = item.snippet.as_deref().filter(|s| !s.is_empty()) {
            lines.push(Line::from(format!("   {snippet}")));
        }
    }
    lines
}

pub fn preview_lines(blog: &BlogResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(blog.plan.blog_title.clone(), bold().fg(Color::Yellow)),
        Line::styled(
            format!(
                "{}  ·  {} words  ·  [m] markdown{}  [z] bundle",
                format_date(Some(&blog.created_at)),
                blog.word_count(),
                if blog.image_specs.is_empty() { "" } else { "  [i] images" },
            ),
            dim(),
        ),
        Line::from(""),
    ];
    lines.extend(markdown_lines(&blog.final_markdown));
    lines
}

pub fn image_lines(blog: &BlogResult, image_url: impl Fn(&str) -> String) -> Vec<Line<'static>> {
    if blog.image_specs.is_empty() {
        return vec![Line::styled(
            "> No images were scheduled or generated for this blog post.",
            dim(),
        )];
    }

    let mut lines = vec![Line::from(vec![
        Span::styled("Visual Assets", bold()),
        Span::styled(
            format!("  GEN_COUNT: {}   [i] download images", blog.image_specs.len()),
            dim(),
        ),
    ])];
    for spec in &blog.image_specs {
        lines.push(Line::from(""));
        lines.push(Line::styled(spec.filename.clone(), bold()));
        lines.push(Line::from(format!("   {}", spec.alt)));
        if !spec.caption.is_empty() {
            lines.push(Line::styled(
                format!("   {}", spec.caption),
                Style::default().add_modifier(Modifier::ITALIC),
            ));
        }
        lines.push(Line::styled(
            format!(
                "   {} · {} · {}",
                spec.placeholder,
                spec.size.replacen("size_", "", 1),
                spec.quality.replacen("quality_", "", 1)
            ),
            dim(),
        ));
        lines.push(Line::styled(format!("   prompt: {}", spec.prompt), dim()));
        lines.push(Line::styled(
            format!("   {}", image_url(&spec.filename)),
            Style::default().fg(Color::Cyan),
        ));
    }
    lines
}

pub fn node_color(node: &str) -> Color {
    match node {
        "system" => Color::White,
        "router" => Color::Blue,
        "research" => Color::Green,
        "orchestrator" => Color::LightRed,
        "worker" => Color::Yellow,
        "reducer" => Color::Red,
        _ => Color::Gray,
    }
}

pub fn log_message_style(entry: &LogEntry) -> Style {
    if entry.is_error() {
        Style::default().fg(Color::Red)
    } else if entry.is_completion() {
        bold().fg(Color::Green)
    } else {
        Style::default()
    }
}

pub fn log_line(entry: &LogEntry, with_millis: bool) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", format_log_time(entry.timestamp, with_millis)), dim()),
        Span::styled(
            format!("{:<13}", entry.node.to_uppercase()),
            bold().fg(node_color(&entry.node)),
        ),
        Span::styled(format!("> {}", entry.message), log_message_style(entry)),
    ])
}

/// Logs only exist for a blog generated in this session.
pub fn log_lines(logs: &[LogEntry], from_history: bool) -> Vec<Line<'static>> {
    if from_history || logs.is_empty() {
        return vec![Line::styled(
            "> No event stream recorded. Logs are only kept for blogs generated in this session.",
            dim(),
        )];
    }
    let mut lines = vec![Line::from(vec![
        Span::styled("Event Stream", bold()),
        Span::styled(format!("  PULSE: {}", logs.len()), dim()),
    ])];
    lines.extend(logs.iter().map(|entry| log_line(entry, true)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageSpec;

    fn item(title: &str, published_at: Option<&str>) -> EvidenceItem {
        EvidenceItem {
            title: title.to_string(),
            url: "https://www.example.org/post".to_string(),
            published_at: published_at.map(str::to_string),
            snippet: None,
            source: None,
        }
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(BlogTab::Plan.next(), BlogTab::Evidence);
        assert_eq!(BlogTab::Logs.next(), BlogTab::Plan);
        assert_eq!(BlogTab::Plan.prev(), BlogTab::Logs);
    }

    #[test]
    fn evidence_sorted_newest_first_with_undated_last() {
        let evidence = vec![
            item("old", Some("2023-01-01")),
            item("undated", None),
            item("new", Some("2025-02-01")),
        ];
        let titles: Vec<_> = sort_evidence(&evidence)
            .into_iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, vec!["new", "old", "undated"]);
    }

    #[test]
    fn evidence_sort_reads_mixed_date_formats() {
        let evidence = vec![
            item("march", Some("Mon, 03 Mar 2025 10:00:00 GMT")),
            item("garbled", Some("last tuesday")),
            item("june", Some("2025-06-15T08:00:00Z")),
            item("august", Some("Fri, 01 Aug 2025 10:00:00 GMT")),
            item("january", Some("2025-01-20")),
        ];
        let titles: Vec<_> = sort_evidence(&evidence)
            .into_iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(titles, vec!["august", "june", "march", "january", "garbled"]);
    }

    #[test]
    fn image_size_and_quality_drop_enum_prefixes() {
        let blog = BlogResult {
            id: "b1".into(),
            plan: BlogPlan {
                blog_title: "Arenas".into(),
                audience: "engineers".into(),
                tone: "direct".into(),
                blog_kind: crate::types::BlogKind::Explainer,
                constraints: Vec::new(),
                tasks: Vec::new(),
            },
            evidence: Vec::new(),
            image_specs: vec![ImageSpec {
                placeholder: "[[IMAGE_1]]".into(),
                filename: "arena.png".into(),
                alt: "Arena layout".into(),
                caption: String::new(),
                prompt: "diagram of an arena".into(),
                size: "size_1024x1024".into(),
                quality: "quality_high".into(),
            }],
            final_markdown: String::new(),
            created_at: "2025-01-01T00:00:00Z".into(),
        };
        let rendered: Vec<String> = image_lines(&blog, |f| format!("http://x/{f}"))
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(rendered.contains(&"   [[IMAGE_1]] · 1024x1024 · high".to_string()));
    }

    #[test]
    fn source_falls_back_to_hostname() {
        assert_eq!(source_label(&item("t", None)), "example.org");
    }

    #[test]
    fn empty_evidence_mentions_closed_book() {
        let lines = evidence_lines(&[], Some("closed_book"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].to_string().contains("Closed-book"));
    }

    #[test]
    fn logs_hidden_for_history_blogs() {
        let entry = LogEntry {
            timestamp: chrono::Utc::now(),
            node: "router".to_string(),
            message: "Routing".to_string(),
        };
        assert_eq!(log_lines(std::slice::from_ref(&entry), true).len(), 1);
        assert_eq!(log_lines(std::slice::from_ref(&entry), false).len(), 2);
    }
}
