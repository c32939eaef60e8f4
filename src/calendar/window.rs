use super::CalendarDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How many days the grid shows at once, and how far Previous/Next move
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum ViewMode {
    /// Sunday through Saturday
    #[default]
    Week,
    Biweek,
    Month,
}

impl ViewMode {
    pub(crate) const fn days(self) -> u16 {
        match self {
            ViewMode::Week => 7,
            ViewMode::Biweek => 14,
            ViewMode::Month => 30,
        }
    }

    pub(crate) const fn next(self) -> ViewMode {
        match self {
            ViewMode::Week => ViewMode::Biweek,
            ViewMode::Biweek => ViewMode::Month,
            ViewMode::Month => ViewMode::Week,
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            ViewMode::Week => "Week",
            ViewMode::Biweek => "2 Weeks",
            ViewMode::Month => "Month",
        }
    }

    fn step(self) -> i64 {
        self.days().into()
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewMode::Week => "week",
            ViewMode::Biweek => "biweek",
            ViewMode::Month => "month",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<ViewMode, ParseViewModeError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "1week" => Ok(ViewMode::Week),
            "biweek" | "2week" | "2weeks" => Ok(ViewMode::Biweek),
            "month" => Ok(ViewMode::Month),
            _ => Err(ParseViewModeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid view mode {0:?}; expected week, biweek, or month")]
pub(crate) struct ParseViewModeError(String);

/// A run of consecutive dates, `first` through `last` inclusive
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
// Invariant: first <= last
pub(crate) struct DateWindow {
    first: CalendarDate,
    last: CalendarDate,
}

impl DateWindow {
    /// `len` days starting at `first`.  Only shorter than `len` when the
    /// calendar itself runs out.
    fn starting_at(first: CalendarDate, len: u16) -> DateWindow {
        let last = first.days_after(i64::from(len.max(1)) - 1);
        DateWindow { first, last }
    }

    /// `len` days ending at `last`
    fn ending_at(last: CalendarDate, len: u16) -> DateWindow {
        let first = last.days_before(i64::from(len.max(1)) - 1);
        DateWindow { first, last }
    }

    pub(crate) fn first(&self) -> CalendarDate {
        self.first
    }

    pub(crate) fn last(&self) -> CalendarDate {
        self.last
    }

    pub(crate) fn len(&self) -> usize {
        usize::try_from(self.first.days_until(self.last) + 1).unwrap_or(0)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CalendarDate> {
        self.first.iter_through(self.last)
    }

    pub(crate) fn get(&self, index: usize) -> Option<CalendarDate> {
        self.iter().nth(index)
    }

    pub(crate) fn contains(&self, date: CalendarDate) -> bool {
        self.first <= date && date <= self.last
    }
}

/// The displayed window together with the date that the next navigation step
/// is computed from
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) window: DateWindow,
    pub(crate) anchor: CalendarDate,
}

// Week windows are whole calendar weeks and are never cut short at `today`;
// the other modes run forward from the anchor and are pushed back to end on
// `today` if they would overrun it.
fn window_for(mode: ViewMode, anchor: CalendarDate, today: CalendarDate) -> DateWindow {
    match mode {
        ViewMode::Week => DateWindow::starting_at(anchor.sunday_on_or_before(), mode.days()),
        ViewMode::Biweek | ViewMode::Month => {
            let window = DateWindow::starting_at(anchor, mode.days());
            if window.last > today {
                DateWindow::ending_at(today, mode.days())
            } else {
                window
            }
        }
    }
}

pub(crate) fn initial_window(mode: ViewMode, today: CalendarDate) -> Viewport {
    match mode {
        ViewMode::Week => {
            let anchor = today.sunday_on_or_before();
            Viewport {
                window: DateWindow::starting_at(anchor, mode.days()),
                anchor,
            }
        }
        ViewMode::Biweek | ViewMode::Month => Viewport {
            window: DateWindow::ending_at(today, mode.days()),
            anchor: today,
        },
    }
}

/// Recenters on a user-chosen date.  Dates after `today` are treated as
/// `today`.
pub(crate) fn set_anchor(mode: ViewMode, requested: CalendarDate, today: CalendarDate) -> Viewport {
    let clamped = requested.min(today);
    let window = window_for(mode, clamped, today);
    // Week snaps to its Sunday; a shifted Biweek/Month window starts earlier
    // than requested.  Either way the window's first day is the anchor.
    Viewport {
        window,
        anchor: window.first,
    }
}

pub(crate) fn step_previous(mode: ViewMode, anchor: CalendarDate) -> Viewport {
    let anchor = anchor.days_before(mode.step());
    // One step back from an anchor at or before today never reaches today, so
    // the anchor itself serves as the upper bound.
    Viewport {
        window: window_for(mode, anchor, anchor.days_after(mode.step())),
        anchor,
    }
}

/// Returns the current viewport unchanged if the next window would end after
/// `today`.
///
/// The step is measured from the anchor, not from the displayed window, so
/// there are windows that `step_next` cannot reach. In Biweek and Month mode a
/// step back from the initial window (anchored on `today`) shows
/// `today - len ..= today - 1`, and stepping forward from there is refused
/// because `anchor + len` is `today` itself. In Week mode the current week
/// usually ends after `today` and is likewise refused. Those windows are
/// reached through `initial_window` or `set_anchor` instead.
pub(crate) fn step_next(mode: ViewMode, anchor: CalendarDate, today: CalendarDate) -> Viewport {
    let next = anchor.days_after(mode.step());
    let window = match mode {
        ViewMode::Week => DateWindow::starting_at(next.sunday_on_or_before(), mode.days()),
        ViewMode::Biweek | ViewMode::Month => DateWindow::starting_at(next, mode.days()),
    };
    if window.last > today {
        Viewport {
            window: window_for(mode, anchor, today),
            anchor,
        }
    } else {
        Viewport {
            window,
            anchor: next,
        }
    }
}

/// Changing the view mode forgets any navigation done in the old mode
pub(crate) fn switch_view_mode(mode: ViewMode, today: CalendarDate) -> Viewport {
    initial_window(mode, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::{macros::date, Date, Month};

    const TODAY: CalendarDate = CalendarDate::new(date!(2024 - 06 - 12));

    fn cd(date: Date) -> CalendarDate {
        CalendarDate::new(date)
    }

    fn dates(window: &DateWindow) -> Vec<String> {
        window.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_initial_week() {
        let vp = initial_window(ViewMode::Week, TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 06 - 09)));
        assert_eq!(
            dates(&vp.window),
            [
                "2024-06-09",
                "2024-06-10",
                "2024-06-11",
                "2024-06-12",
                "2024-06-13",
                "2024-06-14",
                "2024-06-15"
            ]
        );
    }

    #[test]
    fn test_initial_month() {
        let vp = initial_window(ViewMode::Month, TODAY);
        assert_eq!(vp.anchor, TODAY);
        assert_eq!(vp.window.len(), 30);
        assert_eq!(vp.window.first(), cd(date!(2024 - 05 - 14)));
        assert_eq!(vp.window.last(), TODAY);
    }

    #[test]
    fn test_initial_biweek() {
        let vp = initial_window(ViewMode::Biweek, TODAY);
        assert_eq!(vp.anchor, TODAY);
        assert_eq!(vp.window.len(), 14);
        assert_eq!(vp.window.first(), cd(date!(2024 - 05 - 30)));
        assert_eq!(vp.window.last(), TODAY);
    }

    #[test]
    fn test_set_anchor_week_snaps_to_sunday() {
        let vp = set_anchor(ViewMode::Week, cd(date!(2024 - 05 - 22)), TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 19)));
        assert_eq!(vp.window.first(), cd(date!(2024 - 05 - 19)));
        assert_eq!(vp.window.last(), cd(date!(2024 - 05 - 25)));
    }

    #[test]
    fn test_set_anchor_future_is_clamped() {
        let vp = set_anchor(ViewMode::Week, cd(date!(2025 - 01 - 01)), TODAY);
        assert_eq!(vp, initial_window(ViewMode::Week, TODAY));
        let vp = set_anchor(ViewMode::Month, cd(date!(2025 - 01 - 01)), TODAY);
        assert_eq!(vp.window.last(), TODAY);
        assert_eq!(vp.window.len(), 30);
        assert_eq!(vp.anchor, vp.window.first());
    }

    #[test]
    fn test_set_anchor_biweek_runs_forward() {
        let vp = set_anchor(ViewMode::Biweek, cd(date!(2024 - 05 - 01)), TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 01)));
        assert_eq!(vp.window.first(), cd(date!(2024 - 05 - 01)));
        assert_eq!(vp.window.last(), cd(date!(2024 - 05 - 14)));
    }

    #[test]
    fn test_set_anchor_biweek_reclamps_to_today() {
        let vp = set_anchor(ViewMode::Biweek, cd(date!(2024 - 06 - 05)), TODAY);
        assert_eq!(vp.window.last(), TODAY);
        assert_eq!(vp.window.len(), 14);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 30)));
    }

    #[test]
    fn test_step_next_cannot_return_to_initial_biweek() {
        let start = initial_window(ViewMode::Biweek, TODAY);
        let back = step_previous(ViewMode::Biweek, start.anchor);
        assert_eq!(back.anchor, cd(date!(2024 - 05 - 29)));
        assert_eq!(back.window.first(), cd(date!(2024 - 05 - 29)));
        assert_eq!(back.window.last(), cd(date!(2024 - 06 - 11)));
        // anchor + 14 is today, and a window starting today overruns it
        assert_eq!(step_next(ViewMode::Biweek, back.anchor, TODAY), back);
        let further = step_previous(ViewMode::Biweek, back.anchor);
        assert_eq!(further.window.first(), cd(date!(2024 - 05 - 15)));
        assert_eq!(step_next(ViewMode::Biweek, further.anchor, TODAY), back);
        assert_ne!(back, start);
    }

    #[test]
    fn test_step_next_cannot_return_to_initial_month() {
        let start = initial_window(ViewMode::Month, TODAY);
        let back = step_previous(ViewMode::Month, start.anchor);
        assert_eq!(back.window.first(), cd(date!(2024 - 05 - 13)));
        assert_eq!(back.window.last(), cd(date!(2024 - 06 - 11)));
        assert_eq!(step_next(ViewMode::Month, back.anchor, TODAY), back);
        assert_eq!(switch_view_mode(ViewMode::Month, TODAY), start);
    }

    #[test]
    fn test_step_previous_week() {
        let vp = initial_window(ViewMode::Week, TODAY);
        let vp = step_previous(ViewMode::Week, vp.anchor);
        assert_eq!(vp.anchor, cd(date!(2024 - 06 - 02)));
        assert_eq!(vp.window.first(), cd(date!(2024 - 06 - 02)));
        assert_eq!(vp.window.last(), cd(date!(2024 - 06 - 08)));
    }

    #[test]
    fn test_step_previous_month() {
        let vp = step_previous(ViewMode::Month, TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 13)));
        assert_eq!(vp.window.first(), cd(date!(2024 - 05 - 13)));
        assert_eq!(vp.window.len(), 30);
        assert_eq!(vp.window.last(), cd(date!(2024 - 06 - 11)));
    }

    #[test]
    fn test_step_next_into_future_is_noop() {
        for mode in [ViewMode::Week, ViewMode::Biweek, ViewMode::Month] {
            let start = initial_window(mode, TODAY);
            assert_eq!(step_next(mode, start.anchor, TODAY), start, "{mode}");
        }
    }

    #[test]
    fn test_step_next_from_the_past() {
        let anchor = cd(date!(2024 - 05 - 12));
        let vp = step_next(ViewMode::Week, anchor, TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 19)));
        assert_eq!(vp.window.last(), cd(date!(2024 - 05 - 25)));
    }

    #[test]
    fn test_step_next_ending_exactly_today() {
        let anchor = cd(date!(2024 - 05 - 16));
        let vp = step_next(ViewMode::Biweek, anchor, TODAY);
        assert_eq!(vp.anchor, cd(date!(2024 - 05 - 30)));
        assert_eq!(vp.window.last(), TODAY);
    }

    #[test]
    fn test_switch_view_mode_resets() {
        let vp = step_previous(ViewMode::Week, TODAY);
        assert_ne!(vp, initial_window(ViewMode::Week, TODAY));
        assert_eq!(
            switch_view_mode(ViewMode::Week, TODAY),
            initial_window(ViewMode::Week, TODAY)
        );
        let month = switch_view_mode(ViewMode::Month, TODAY);
        assert!(month.window.contains(TODAY));
        assert_eq!(month.window.last(), TODAY);
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("week".parse::<ViewMode>().ok(), Some(ViewMode::Week));
        assert_eq!("2week".parse::<ViewMode>().ok(), Some(ViewMode::Biweek));
        assert_eq!("Month".parse::<ViewMode>().ok(), Some(ViewMode::Month));
        assert!("fortnight".parse::<ViewMode>().is_err());
    }

    fn any_mode() -> impl Strategy<Value = ViewMode> {
        prop_oneof![
            Just(ViewMode::Week),
            Just(ViewMode::Biweek),
            Just(ViewMode::Month)
        ]
    }

    fn any_date() -> impl Strategy<Value = CalendarDate> {
        (1900i32..2100, 1u8..=12, 1u8..=28).prop_map(|(y, m, d)| {
            let month = Month::try_from(m).unwrap_or(Month::January);
            CalendarDate::new(Date::from_calendar_date(y, month, d).unwrap_or(Date::MIN))
        })
    }

    fn is_contiguous(window: &DateWindow) -> bool {
        let days = window.iter().collect::<Vec<_>>();
        days.windows(2).all(|p| p[0].days_until(p[1]) == 1)
    }

    proptest! {
        #[test]
        fn prop_next_then_previous_round_trips(
            mode in any_mode(),
            today in any_date(),
            back in 0i64..400,
        ) {
            let anchor = today.days_before(back);
            let next = step_next(mode, anchor, today);
            if next.anchor == anchor {
                prop_assert_eq!(step_next(mode, anchor, today), next);
            } else {
                prop_assert_eq!(step_previous(mode, next.anchor).anchor, anchor);
            }
        }

        #[test]
        fn prop_next_never_passes_today_when_it_moves(
            mode in any_mode(),
            today in any_date(),
            back in 0i64..400,
        ) {
            let anchor = today.days_before(back);
            let vp = step_next(mode, anchor, today);
            if vp.anchor != anchor {
                prop_assert!(vp.window.last() <= today);
            }
        }

        #[test]
        fn prop_week_windows_are_sunday_aligned(
            today in any_date(),
            requested in any_date(),
        ) {
            for vp in [
                initial_window(ViewMode::Week, today),
                set_anchor(ViewMode::Week, requested, today),
                step_previous(ViewMode::Week, requested),
                step_next(ViewMode::Week, requested, today),
            ] {
                prop_assert_eq!(vp.window.first(), vp.window.first().sunday_on_or_before());
                prop_assert_eq!(vp.window.len(), 7);
                prop_assert!(is_contiguous(&vp.window));
            }
        }

        #[test]
        fn prop_set_anchor_never_passes_today_except_current_week(
            mode in any_mode(),
            today in any_date(),
            requested in any_date(),
        ) {
            let vp = set_anchor(mode, requested, today);
            prop_assert!(vp.anchor <= today);
            prop_assert_eq!(vp.window.len(), usize::from(mode.days()));
            if mode != ViewMode::Week {
                prop_assert!(vp.window.last() <= today);
            }
        }

        #[test]
        fn prop_switch_includes_today(mode in any_mode(), today in any_date()) {
            let vp = switch_view_mode(mode, today);
            prop_assert!(vp.window.contains(today));
            prop_assert_eq!(vp.window.len(), usize::from(mode.days()));
        }
    }
}
