use crate::calendar::CalendarDate;
use crate::popup;
use crate::theme::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{StatefulWidget, Widget},
};

/// Cursor position once all eight digits are in
const ENTER_POS: usize = 8;

/// "YYYY-MM-DD" plus a blank cell either side
const CONTENT_WIDTH: usize = 12;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let text = state.to_text();
        let (width, height) = popup::outer_size(CONTENT_WIDTH, text.height());
        let text_area = popup::frame(area, buf, width, height, "Go to date");
        text.render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    // YYYYMMDD
    digits: [Option<u8>; 8],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        let enter_style = if self.pos == ENTER_POS {
            READY_ENTER_STYLE
        } else {
            BASE_STYLE
        };
        // A bare span keeps the underline off the centering padding
        let enter = Line::from(Span::styled("[ENTER]", enter_style));
        Text::from_iter([self.to_line(), Line::default(), enter]).centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (fallback, dg)) in "YYYYMMDD".chars().zip(self.digits).enumerate() {
            if i == 4 || i == 6 {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(d.to_string(), BASE_STYLE),
                None => Span::styled(fallback.to_string(), UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    fn number(digits: &[Option<u8>]) -> Option<u16> {
        digits
            .iter()
            .try_fold(0u16, |acc, d| Some(acc * 10 + u16::from((*d)?)))
    }

    fn date(&self) -> Option<CalendarDate> {
        let year = Self::number(&self.digits[0..4])?;
        let month = u8::try_from(Self::number(&self.digits[4..6])?).ok()?;
        let day = u8::try_from(Self::number(&self.digits[6..8])?).ok()?;
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year.into(), month, day)
            .ok()
            .map(CalendarDate::new)
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Digit(d), 0..ENTER_POS) if d < 10 => {
                self.digits[self.pos] = Some(d);
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                self.digits[self.pos] = None;
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, ENTER_POS) => {
                self.date().map_or(JumpToOutput::Invalid, JumpToOutput::Jump)
            }
            _ => JumpToOutput::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(CalendarDate),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_digits(state: &mut JumpToState, digits: &str) {
        for c in digits.chars() {
            let d = c.to_digit(10).and_then(|d| u8::try_from(d).ok()).expect("digit");
            assert_eq!(state.handle_input(JumpToInput::Digit(d)), JumpToOutput::Ok);
        }
    }

    #[test]
    fn test_jump() {
        let mut state = JumpToState::new();
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        type_digits(&mut state, "20240603");
        assert_eq!(
            state.handle_input(JumpToInput::Digit(1)),
            JumpToOutput::Invalid
        );
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(CalendarDate::new(date!(2024 - 06 - 03)))
        );
    }

    #[test]
    fn test_invalid_date() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "20230229");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        assert_eq!(state.handle_input(JumpToInput::Backspace), JumpToOutput::Ok);
        type_digits(&mut state, "8");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(CalendarDate::new(date!(2023 - 02 - 28)))
        );
    }

    #[test]
    fn test_backspace_at_start() {
        let mut state = JumpToState::new();
        assert_eq!(
            state.handle_input(JumpToInput::Backspace),
            JumpToOutput::Invalid
        );
    }

    #[test]
    fn test_line() {
        let mut state = JumpToState::new();
        type_digits(&mut state, "2024");
        assert_eq!(state.to_line().to_string(), "2024-MM-DD");
    }
}
