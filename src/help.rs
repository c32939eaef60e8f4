use crate::popup;
use crate::theme::TITLE_STYLE;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Widget,
};

const KEY_WIDTH: usize = 20;

static KEYS: &[(&str, &str)] = &[
    ("h, l, LEFT, RIGHT", "Move between columns"),
    ("k, j, UP, DOWN", "Move between metrics"),
    ("[, PAGE UP", "Previous period"),
    ("], PAGE DOWN", "Next period"),
    ("0, HOME", "Jump to the current period"),
    ("g", "Input date to jump to"),
    ("v", "Cycle view: week, 2 weeks, month"),
    ("1, 2, 3", "Week, 2 week, or month view"),
    ("SPACE", "Cycle rating of a date cell"),
    ("ENTER", "Edit the selected cell"),
    ("a", "Add a metric"),
    ("x", "Delete the selected metric"),
    ("K, J", "Move the selected metric up/down"),
    ("e", "Export the window as CSV"),
    ("?", "Show this help"),
    ("q, ESC", "Quit"),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help;

impl Help {
    fn text() -> Text<'static> {
        let mut lines = KEYS
            .iter()
            .map(|&(keys, action)| {
                Line::from_iter([
                    Span::styled(format!("{keys:KEY_WIDTH$}"), TITLE_STYLE),
                    Span::raw(action),
                ])
            })
            .collect::<Vec<_>>();
        lines.push(Line::default());
        lines.push(Line::raw("Press any key to close"));
        Text::from(lines)
    }
}

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Help::text();
        let (width, height) = popup::outer_size(text.width(), text.height());
        let text_area = popup::frame(area, buf, width, height, "Keys");
        text.render(text_area, buf);
    }
}
