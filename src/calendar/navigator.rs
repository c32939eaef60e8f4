use super::window::{
    initial_window, set_anchor, step_next, step_previous, switch_view_mode, DateWindow, ViewMode,
    Viewport,
};
use super::CalendarDate;
use thiserror::Error;

/// Where the grid currently is on the calendar
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Navigator {
    today: CalendarDate,
    mode: ViewMode,
    viewport: Viewport,
}

impl Navigator {
    pub(crate) fn new(today: CalendarDate, mode: ViewMode) -> Self {
        Navigator {
            today,
            mode,
            viewport: initial_window(mode, today),
        }
    }

    pub(crate) fn start_date(mut self, date: CalendarDate) -> Self {
        self.jump_to_date(date);
        self
    }

    pub(crate) fn today(&self) -> CalendarDate {
        self.today
    }

    pub(crate) fn mode(&self) -> ViewMode {
        self.mode
    }

    pub(crate) fn window(&self) -> DateWindow {
        self.viewport.window
    }

    pub(crate) fn anchor(&self) -> CalendarDate {
        self.viewport.anchor
    }

    pub(crate) fn jump_to_today(&mut self) {
        self.viewport = initial_window(self.mode, self.today);
    }

    pub(crate) fn jump_to_date(&mut self, date: CalendarDate) {
        self.viewport = set_anchor(self.mode, date, self.today);
    }

    pub(crate) fn switch_view_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.viewport = switch_view_mode(mode, self.today);
    }

    pub(crate) fn one_period_backwards(&mut self) {
        self.viewport = step_previous(self.mode, self.viewport.anchor);
    }

    pub(crate) fn one_period_forwards(&mut self) -> Result<(), FutureBoundError> {
        let next = step_next(self.mode, self.viewport.anchor, self.today);
        if next.anchor == self.viewport.anchor {
            Err(FutureBoundError)
        } else {
            self.viewport = next;
            Ok(())
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot navigate past today")]
pub(crate) struct FutureBoundError;
