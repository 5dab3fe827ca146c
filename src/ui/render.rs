use super::blog::BlogTab;
use super::layout::toast_area;
use super::text::{cursor_position, truncate, wrap_lines};
use crate::state::{Toast, ToastLevel};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

const INPUT_PLACEHOLDER: &str = "What should the next blog be about?";

pub fn input_visual_rows(input: &str, width: usize) -> usize {
    wrap_lines(input, width).len().max(1)
}

/// Topic prompt. Greyed out without a cursor while `enabled` is false.
pub fn render_input(frame: &mut Frame<'_>, area: Rect, input: &str, cursor_byte: usize, enabled: bool) {
    if area.height == 0 || area.width <= 2 {
        return;
    }

    let input_width = area.width.saturating_sub(2).max(1) as usize;
    let lines = wrap_lines(input, input_width);
    let (cursor_row, cursor_col) = cursor_position(input, cursor_byte, input_width);
    let visible_rows = area.height as usize;
    let window_start = cursor_row.saturating_add(1).saturating_sub(visible_rows);

    let mut rendered = Vec::with_capacity(visible_rows);
    if input.is_empty() {
        let hint = if enabled {
            INPUT_PLACEHOLDER
        } else {
            "Generating... Ctrl+C to cancel"
        };
        rendered.push(Line::styled(
            format!("> {hint}"),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for offset in 0..visible_rows {
            let row_index = window_start + offset;
            let prefix = if row_index == 0 { "> " } else { "  " };
            let line = lines.get(row_index).cloned().unwrap_or_default();
            rendered.push(Line::from(format!("{prefix}{line}")));
        }
    }

    let style = if enabled {
        Style::default().fg(Color::White).bg(Color::Rgb(24, 24, 24))
    } else {
        Style::default()
            .fg(Color::Gray)
            .bg(Color::Rgb(24, 24, 24))
            .add_modifier(Modifier::DIM)
    };
    frame.render_widget(Paragraph::new(rendered).style(style), area);

    if enabled {
        let cursor_y = area
            .y
            .saturating_add(cursor_row.saturating_sub(window_start) as u16);
        let cursor_x = area
            .x
            .saturating_add(2 + cursor_col as u16)
            .min(area.x.saturating_add(area.width.saturating_sub(1)));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Scrollable, wrapped body text.
pub fn render_lines(frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>, scroll: usize) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, status: &str) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let text = truncate(status, area.width as usize);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: BlogTab) {
    if area.height == 0 {
        return;
    }
    let titles = BlogTab::ALL.iter().map(|tab| tab.title());
    let tabs = Tabs::new(titles)
        .select(active.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("│");
    frame.render_widget(tabs, area);
}

fn toast_style(level: ToastLevel) -> (Style, &'static str) {
    match level {
        ToastLevel::Info => (Style::default().fg(Color::Cyan), "info"),
        ToastLevel::Success => (Style::default().fg(Color::Green), "done"),
        ToastLevel::Error => (Style::default().fg(Color::Red), "error"),
    }
}

/// Notifications stacked in the top-right corner, oldest on top.
pub fn render_toasts<'a>(frame: &mut Frame<'_>, toasts: impl ExactSizeIterator<Item = &'a Toast>) {
    let count = toasts.len();
    let Some(area) = toast_area(frame.area(), count) else {
        return;
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); count])
        .split(area);

    for (toast, row) in toasts.zip(rows.iter()) {
        if row.height < 3 {
            break;
        }
        let (style, title) = toast_style(toast.level);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(style);
        let text = truncate(&toast.message, row.width.saturating_sub(2) as usize);
        frame.render_widget(Clear, *row);
        frame.render_widget(Paragraph::new(text).block(block), *row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn input_rows_follow_wrapping() {
        assert_eq!(input_visual_rows("", 10), 1);
        assert_eq!(input_visual_rows("abcdefghijkl", 10), 2);
        assert_eq!(input_visual_rows("a\nb\nc", 10), 3);
    }

    #[test]
    fn toasts_draw_in_top_right_corner() {
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        let toasts = [Toast::new(ToastLevel::Success, "MD downloaded successfully!")];
        terminal
            .draw(|frame| render_toasts(frame, toasts.iter()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..90u16)
            .map(|x| buffer[(x, 2u16)].symbol().to_string())
            .collect();
        assert!(row.contains("MD downloaded"));
        assert_eq!(buffer[(89u16, 1u16)].symbol(), "┐");
    }
}
