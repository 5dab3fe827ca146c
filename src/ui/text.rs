use unicode_width::UnicodeWidthChar;

pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Soft-wrap `text` at `width` columns, honouring explicit newlines.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![String::new()];
    let mut used = 0usize;

    for ch in text.chars().filter(|ch| *ch != '\r') {
        if ch == '\n' {
            lines.push(String::new());
            used = 0;
            continue;
        }
        let w = char_width(ch);
        if used + w > width && used > 0 {
            lines.push(String::new());
            used = 0;
        }
        if let Some(line) = lines.last_mut() {
            line.push(ch);
        }
        used += w;
    }
    lines
}

/// Row and column of the byte offset `cursor` once `text` is wrapped.
pub fn cursor_position(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let cursor = floor_char_boundary(text, cursor);
    let (mut row, mut col) = (0usize, 0usize);

    for ch in text[..cursor].chars().filter(|ch| *ch != '\r') {
        if ch == '\n' {
            row += 1;
            col = 0;
            continue;
        }
        let w = char_width(ch);
        if col + w > width && col > 0 {
            row += 1;
            col = 0;
        }
        col += w;
    }

    if col >= width {
        (row + 1, 0)
    } else {
        (row, col)
    }
}

pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Cut `text` to `width` columns, ending in `...` when something was dropped.
pub fn truncate(text: &str, width: usize) -> String {
    let width = width.max(1);
    if display_width(text) <= width {
        return text.to_string();
    }

    let budget = if width >= 4 { width - 3 } else { width };
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = char_width(ch);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width >= 4 {
        out.push_str("...");
    }
    out
}
