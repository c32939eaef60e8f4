use crate::calendar::CalendarDate;
use crate::model::{MetricId, ThresholdKind};
use crate::popup;
use crate::theme::{
    editor::{CURSOR_STYLE, HINT_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{StatefulWidget, Widget},
};

const MAX_LEN: usize = 40;

/// Which grid cell an edit will be written back to
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum EditTarget {
    /// Display name of the metric at this row
    Name(usize),
    Threshold(MetricId, ThresholdKind),
    Value(CalendarDate, MetricId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Editor;

impl StatefulWidget for Editor {
    type State = EditorState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Room for the cursor after a full entry
        let (width, height) = popup::outer_size(MAX_LEN + 1, 4);
        let text_area = popup::frame(area, buf, width, height, "Edit");
        state.to_text().render(text_area, buf);
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EditorState {
    target: EditTarget,
    title: String,
    hint: &'static str,
    buffer: String,
}

impl EditorState {
    /// Starts editing with the cell's current text already filled in
    pub(crate) fn new(
        target: EditTarget,
        title: String,
        hint: &'static str,
        current: &str,
    ) -> EditorState {
        EditorState {
            target,
            title,
            hint,
            buffer: current.chars().take(MAX_LEN).collect(),
        }
    }

    pub(crate) fn target(&self) -> &EditTarget {
        &self.target
    }

    fn to_text(&self) -> Text<'_> {
        Text::from_iter([
            Line::styled(self.title.as_str(), BASE_STYLE),
            Line::styled("", BASE_STYLE),
            Line::from_iter([
                Span::styled(self.buffer.as_str(), BASE_STYLE),
                Span::styled("_", CURSOR_STYLE),
            ]),
            Line::styled(self.hint, HINT_STYLE),
        ])
    }

    pub(crate) fn handle_input(&mut self, input: EditInput) -> EditOutput {
        match input {
            EditInput::Char(c) if !c.is_control() && self.buffer.chars().count() < MAX_LEN => {
                self.buffer.push(c);
                EditOutput::Ok
            }
            EditInput::Char(_) => EditOutput::Invalid,
            EditInput::Backspace if self.buffer.pop().is_some() => EditOutput::Ok,
            EditInput::Backspace => EditOutput::Invalid,
            EditInput::Clear => {
                self.buffer.clear();
                EditOutput::Ok
            }
            EditInput::Enter => EditOutput::Commit(self.buffer.trim().to_owned()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EditInput {
    Char(char),
    Backspace,
    /// Erase the whole entry
    Clear,
    Enter,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum EditOutput {
    Ok,
    Invalid,
    Commit(String),
}
