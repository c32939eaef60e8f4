use crate::theme::BASE_STYLE;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    widgets::{Block, Clear, Widget},
};

/// Clears a `width`×`height` box in the middle of `area`, draws a titled
/// border one cell inside it, and returns the area left for content.
///
/// ```text
/// ..............
/// .┌─ title ──┐.
/// .│ content  │.
/// .└──────────┘.
/// ..............
/// ```
pub(crate) fn frame(area: Rect, buf: &mut Buffer, width: u16, height: u16, title: &str) -> Rect {
    let [outer] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [outer] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(outer);
    Clear.render(outer, buf);
    Block::new().style(BASE_STYLE).render(outer, buf);
    let bordered = outer.inner(Margin::new(1, 1));
    let block = Block::bordered()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .style(BASE_STYLE);
    let inner = block.inner(bordered);
    block.render(bordered, buf);
    inner
}

/// Outer size needed to show content of the given size inside a frame
pub(crate) fn outer_size(content_width: usize, content_height: usize) -> (u16, u16) {
    let grow = |n: usize| u16::try_from(n).unwrap_or(u16::MAX).saturating_add(4);
    (grow(content_width), grow(content_height))
}
