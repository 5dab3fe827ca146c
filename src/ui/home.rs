use super::format::format_relative_date;
use super::text::truncate;
use crate::types::PastBlog;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Kind, size and age under a history entry's title.
pub fn past_blog_meta(blog: &PastBlog, now: DateTime<Utc>) -> Line<'static> {
    let mut meta = vec![
        Span::styled(
            blog.blog_kind.label().to_uppercase(),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  {} W", blog.word_count),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if blog.has_images {
        meta.push(Span::styled("  ▣ images", Style::default().fg(Color::Magenta)));
    }
    let age = format_relative_date(&blog.created_at, now);
    if !age.is_empty() {
        meta.push(Span::styled(
            format!("  {age}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(meta)
}

pub fn past_blog_item(blog: &PastBlog, width: usize, now: DateTime<Utc>) -> ListItem<'static> {
    let title = if blog.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        truncate(&blog.title, width.saturating_sub(4))
    };

    ListItem::new(vec![
        Line::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        past_blog_meta(blog, now),
    ])
}

pub fn render_past_blogs(
    frame: &mut Frame<'_>,
    area: Rect,
    blogs: &[PastBlog],
    selected: usize,
    loading: bool,
) {
    if area.height < 3 || area.width < 10 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Past blogs ({}) ", blogs.len()))
        .border_style(Style::default().fg(Color::DarkGray));

    if blogs.is_empty() {
        let message = if loading {
            "Loading past blogs..."
        } else {
            "No blogs yet. Type a topic below and press Enter."
        };
        frame.render_widget(
            Paragraph::new(Line::styled(message, Style::default().fg(Color::DarkGray)))
                .block(block),
            area,
        );
        return;
    }

    let now = Utc::now();
    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem<'static>> = blogs
        .iter()
        .map(|blog| past_blog_item(blog, width, now))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 40)))
        .highlight_symbol("▌ ");

    let mut state = ListState::default().with_selected(Some(selected.min(blogs.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}
