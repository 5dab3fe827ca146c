//! Article markdown to styled terminal lines.
//!
//! Walks `pulldown_cmark` events with a style stack. Block elements (headings,
//! paragraphs, lists, quotes, fenced code, tables, rules) become their own
//! lines; inline markup becomes styled spans.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const STYLE_CODE_BLOCK: Style = Style::new().fg(Color::Green);
const STYLE_INLINE_CODE: Style = Style::new().fg(Color::Cyan);
const STYLE_LINK: Style = Style::new().fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
const STYLE_IMAGE: Style = Style::new().fg(Color::Magenta);
const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);
const RULE_WIDTH: usize = 40;

fn heading_style(level: HeadingLevel) -> Style {
    let bold = Style::new().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 | HeadingLevel::H2 => bold.fg(Color::Yellow),
        _ => bold,
    }
}

#[derive(Default)]
struct Table {
    rows: Vec<Vec<Vec<Span<'static>>>>,
    row: Vec<Vec<Span<'static>>>,
    cell: Vec<Span<'static>>,
    has_head: bool,
}

impl Table {
    fn render(self) -> Vec<Line<'static>> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell_width(cell));
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (index, row) in self.rows.into_iter().enumerate() {
            let mut spans = vec![Span::styled("│", STYLE_DIM)];
            let mut cells = row.into_iter();
            for width in &widths {
                let cell = cells.next().unwrap_or_default();
                let pad = width - cell_width(&cell);
                spans.push(Span::raw(" "));
                spans.extend(cell);
                spans.push(Span::raw(" ".repeat(pad + 1)));
                spans.push(Span::styled("│", STYLE_DIM));
            }
            lines.push(Line::from(spans));

            if index == 0 && self.has_head {
                let parts: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                lines.push(Line::from(Span::styled(
                    format!("├{}┤", parts.join("┼")),
                    STYLE_DIM,
                )));
            }
        }
        lines
    }
}

fn cell_width(cell: &[Span<'_>]) -> usize {
    cell.iter().map(Span::width).sum()
}

struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Next number for ordered lists, `None` for bullets.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    heading: Option<HeadingLevel>,
    in_code_block: bool,
    link: Option<String>,
    table: Option<Table>,
}

impl Renderer {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default()],
            lists: Vec::new(),
            quote_depth: 0,
            heading: None,
            in_code_block: false,
            link: None,
            table: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.table.as_mut() {
            Some(table) => table.cell.push(span),
            None => self.spans.push(span),
        }
    }

    fn push_line(&mut self, mut spans: Vec<Span<'static>>) {
        if self.quote_depth > 0 {
            spans.insert(0, Span::styled("│ ".repeat(self.quote_depth), STYLE_DIM));
        }
        self.lines.push(Line::from(spans));
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.push_line(spans);
        }
    }

    /// At most one empty line between blocks.
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            for line in text.lines() {
                self.push_line(vec![Span::styled(format!("  {line}"), STYLE_CODE_BLOCK)]);
            }
            return;
        }
        let content = if self.heading == Some(HeadingLevel::H1) {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        let style = self.style();
        self.push_span(Span::styled(content, style));
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(level);
                self.push_style(heading_style(level));
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::new().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push_line(vec![Span::styled(format!("  {lang}"), STYLE_DIM)]);
                    }
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len());
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{indent}{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.spans.push(Span::raw(marker));
            }
            Tag::Strong => self.push_style(Style::new().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(Style::new().add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self.push_style(Style::new().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(STYLE_LINK);
            }
            Tag::Image { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_style(STYLE_IMAGE);
                self.push_span(Span::styled("[image: ", STYLE_IMAGE));
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(Table::default());
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.has_head = true;
                }
                self.push_style(Style::new().add_modifier(Modifier::BOLD));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = None;
                self.pop_style();
                self.blank();
            }
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link.take() {
                    if !url.starts_with('#') {
                        self.push_span(Span::styled(format!(" ({url})"), STYLE_DIM));
                    }
                }
            }
            TagEnd::Image => {
                self.pop_style();
                let url = self.link.take().unwrap_or_default();
                self.push_span(Span::styled(format!("] {url}"), STYLE_IMAGE));
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    table.row.push(cell);
                }
            }
            TagEnd::TableHead => {
                self.pop_style();
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.render() {
                        self.push_line(line.spans);
                    }
                }
                self.blank();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render GitHub-flavoured markdown (tables, strikethrough, task lists) for
/// the Preview tab.
pub fn markdown_lines(markdown: &str) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut renderer = Renderer::new();

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(code) => {
                let style = renderer.style().patch(STYLE_INLINE_CODE);
                renderer.push_span(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak => renderer.push_span(Span::raw(" ")),
            Event::HardBreak => renderer.flush(),
            Event::Rule => {
                renderer.flush();
                renderer.push_line(vec![Span::styled("─".repeat(RULE_WIDTH), STYLE_DIM)]);
                renderer.blank();
            }
            Event::TaskListMarker(done) => {
                renderer.push_span(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let html = html.trim_end();
                if !html.is_empty() {
                    renderer.push_span(Span::styled(html.to_string(), STYLE_DIM));
                }
            }
            _ => {}
        }
    }
    renderer.finish()
}
