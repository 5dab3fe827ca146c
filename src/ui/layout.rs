use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

pub fn split_screen(area: Rect, footer_rows: u16) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(footer_rows.max(1)),
        ])
        .split(area);

    ScreenLayout {
        header: chunks[0],
        body: chunks[1],
        footer: chunks[2],
    }
}

/// Home screen body: the progress panel (while generating) above the past
/// blog list.
pub fn split_home_body(body: Rect, generating: bool) -> (Option<Rect>, Rect) {
    if !generating {
        return (None, body);
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(body);
    (Some(chunks[0]), chunks[1])
}

/// Blog screen body: one row of tab titles above the tab content.
pub fn split_tabs(body: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(body);
    (chunks[0], chunks[1])
}

/// Top-right stack for notifications, one bordered row-group per toast.
pub fn toast_area(area: Rect, toasts: usize) -> Option<Rect> {
    if toasts == 0 || area.width < 20 || area.height < 4 {
        return None;
    }
    let width = (area.width / 3).clamp(20, 48).min(area.width);
    let height = ((toasts as u16) * 3).min(area.height.saturating_sub(1));
    Some(Rect::new(
        area.x + area.width - width,
        area.y + 1,
        width,
        height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_splits_into_three_panes() {
        let area = Rect::new(0, 0, 80, 20);
        let panes = split_screen(area, 4);

        assert_eq!(panes.header.height, 1);
        assert_eq!(panes.body.height, 15);
        assert_eq!(panes.footer.height, 4);
        assert_eq!(panes.body.y, 1);
        assert_eq!(panes.footer.y, 16);
    }

    #[test]
    fn home_body_only_splits_while_generating() {
        let body = Rect::new(0, 1, 80, 20);
        assert_eq!(split_home_body(body, false), (None, body));

        let (progress, list) = split_home_body(body, true);
        assert_eq!(progress.unwrap().height, 14);
        assert_eq!(list.height, 6);
    }

    #[test]
    fn toast_area_hugs_the_right_edge() {
        let area = Rect::new(0, 0, 120, 40);
        let rect = toast_area(area, 2).unwrap();
        assert_eq!(rect.x + rect.width, 120);
        assert_eq!(rect.height, 6);
        assert!(toast_area(area, 0).is_none());
    }
}
