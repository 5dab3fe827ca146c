use super::blog::log_line;
use crate::state::{GenerationState, StageStatus, PIPELINE_STAGES};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

fn stage_span(label: &str, status: StageStatus) -> Span<'static> {
    match status {
        StageStatus::Complete => Span::styled(
            format!("✓ {label}"),
            Style::default().fg(Color::Green),
        ),
        StageStatus::Current => Span::styled(
            format!("● {label}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        StageStatus::Pending => Span::styled(
            format!("○ {label}"),
            Style::default().fg(Color::DarkGray),
        ),
    }
}

pub fn stage_line(state: &GenerationState) -> Line<'static> {
    let mut spans = Vec::with_capacity(PIPELINE_STAGES.len() * 2);
    for (i, stage) in PIPELINE_STAGES.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" → ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(stage_span(stage.label, state.stage_status(i)));
    }
    Line::from(spans)
}

/// Mode, evidence and query facts reported so far.
pub fn metadata_lines(state: &GenerationState) -> Vec<Line<'static>> {
    let data = &state.data;
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    let mut facts = Vec::new();
    if let Some(mode) = &data.mode {
        facts.push(Span::styled("MODE ", label));
        facts.push(Span::raw(format!("{mode}   ")));
    }
    if let Some(count) = data.evidence_count {
        facts.push(Span::styled("SOURCES ", label));
        facts.push(Span::raw(format!("{count}   ")));
    }
    if let Some(tasks) = data.tasks_planned {
        facts.push(Span::styled("SECTIONS ", label));
        facts.push(Span::raw(format!("{tasks}   ")));
    }
    if let Some(images) = data.images_planned {
        facts.push(Span::styled("IMAGES ", label));
        facts.push(Span::raw(images.to_string()));
    }
    if !facts.is_empty() {
        lines.push(Line::from(facts));
    }

    if let Some(queries) = data.queries.as_ref().filter(|q| !q.is_empty()) {
        lines.push(Line::styled("Queries", label));
        for query in queries {
            lines.push(Line::from(format!("  ? {query}")));
        }
    }
    lines
}

pub fn render_progress(frame: &mut Frame<'_>, area: Rect, state: &GenerationState) {
    if area.height < 4 || area.width < 10 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Generating ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let has_sections = state.section_progress().is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(if has_sections { 1 } else { 0 }),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(stage_line(state)), chunks[0]);

    let mut status = vec![Line::styled(
        state.status_text.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(step) = state.secondary_step() {
        status.push(Line::styled(
            step.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(status), chunks[1]);

    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow))
            .percent(state.progress.clamp(0.0, 100.0).round() as u16),
        chunks[2],
    );

    if let Some((done, total, percent)) = state.section_progress() {
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio((percent / 100.0).clamp(0.0, 1.0))
                .label(format!("sections {done} / {total}")),
            chunks[3],
        );
    }

    let mut lines = metadata_lines(state);
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    let room = (chunks[4].height as usize).saturating_sub(lines.len());
    let skip = state.logs.len().saturating_sub(room);
    lines.extend(state.logs.iter().skip(skip).map(|entry| log_line(entry, false)));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        chunks[4],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressData, SseEvent};

    #[test]
    fn stage_line_marks_current_stage() {
        let mut state = GenerationState::new();
        state.begin();
        state.apply_event(SseEvent::Progress {
            node: "research".into(),
            data: ProgressData::default(),
        });

        let rendered = stage_line(&state).to_string();
        assert!(rendered.contains("✓ Router"));
        assert!(rendered.contains("● Research"));
        assert!(rendered.contains("○ Reducer"));
    }

    #[test]
    fn metadata_lists_queries() {
        let mut state = GenerationState::new();
        state.data = ProgressData {
            mode: Some("hybrid".into()),
            evidence_count: Some(7),
            queries: Some(vec!["rust async".into(), "tokio".into()]),
            ..ProgressData::default()
        };

        let lines: Vec<String> = metadata_lines(&state).iter().map(|l| l.to_string()).collect();
        assert!(lines[0].contains("hybrid"));
        assert!(lines[0].contains("SOURCES 7"));
        assert_eq!(lines[1], "Queries");
        assert_eq!(lines[3], "  ? tokio");
    }

    #[test]
    fn metadata_empty_before_any_progress() {
        assert!(metadata_lines(&GenerationState::new()).is_empty());
    }
}
