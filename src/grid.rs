use crate::calendar::CalendarDate;
use crate::model::{Metric, ThresholdKind};
use crate::store::Storage;
use crate::theme::{
    grid::{rating_style, score_style, CURSOR_MODIFIER, HEADER_STYLE, THRESHOLD_STYLE, TODAY_STYLE},
    BASE_STYLE,
};
use crate::tracker::Tracker;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Cell, Row, StatefulWidget, Table, Widget},
};

const NAME_WIDTH: u16 = 24;
const THRESHOLD_WIDTH: u16 = 6;
const DATE_WIDTH: u16 = 7;
const SPACING: u16 = 1;
const FIXED_WIDTH: u16 = NAME_WIDTH + 2 * THRESHOLD_WIDTH + 3 * SPACING;

/// Name, target, and limit come before the date columns
const FIXED_COLUMNS: usize = 3;

/// Two header lines plus the score footer
const CHROME_HEIGHT: u16 = 3;

/// What kind of cell a grid column holds
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Column {
    Name,
    Threshold(ThresholdKind),
    /// Index into the current date window
    Date(usize),
}

/// Cursor position and scroll offsets of the grid
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct GridState {
    row: usize,
    column: usize,
    row_offset: usize,
    date_offset: usize,
}

impl GridState {
    pub(crate) fn new() -> GridState {
        GridState::default()
    }

    /// Index of the selected metric
    pub(crate) fn row(&self) -> usize {
        self.row
    }

    pub(crate) fn column(&self) -> Column {
        match self.column {
            0 => Column::Name,
            1 => Column::Threshold(ThresholdKind::Target),
            2 => Column::Threshold(ThresholdKind::Limit),
            n => Column::Date(n - FIXED_COLUMNS),
        }
    }

    pub(crate) fn move_up(&mut self) -> bool {
        if self.row > 0 {
            self.row -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn move_down(&mut self, rows: usize) -> bool {
        if self.row + 1 < rows {
            self.row += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn move_left(&mut self) -> bool {
        if self.column > 0 {
            self.column -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn move_right(&mut self, dates: usize) -> bool {
        if self.column + 1 < FIXED_COLUMNS + dates {
            self.column += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn select_row(&mut self, row: usize) {
        self.row = row;
    }

    /// Keeps the cursor inside a grid of the given size, e.g. after a row was
    /// deleted or the window shrank
    pub(crate) fn clamp(&mut self, rows: usize, dates: usize) {
        self.row = self.row.min(rows.saturating_sub(1));
        self.column = self.column.min(FIXED_COLUMNS + dates.saturating_sub(1));
    }

    fn scroll_into_view(&mut self, body_rows: usize, dates: usize, date_columns: usize) {
        self.row_offset = scrolled(self.row_offset, self.row, body_rows);
        if let Column::Date(i) = self.column() {
            self.date_offset = scrolled(self.date_offset, i, date_columns);
        }
        self.date_offset = self.date_offset.min(dates.saturating_sub(date_columns));
    }
}

// New offset of a `visible`-long view so that it includes `pos`
fn scrolled(offset: usize, pos: usize, visible: usize) -> usize {
    if pos < offset {
        pos
    } else if pos >= offset + visible {
        pos + 1 - visible
    } else {
        offset
    }
}

/// The metric × date table of the current window
#[derive(Debug)]
pub(crate) struct Grid<'a, S> {
    tracker: &'a Tracker<S>,
}

impl<'a, S> Grid<'a, S> {
    pub(crate) fn new(tracker: &'a Tracker<S>) -> Grid<'a, S> {
        Grid { tracker }
    }
}

impl<S: Storage> Grid<'_, S> {
    fn header(&self, dates: &[CalendarDate]) -> Row<'static> {
        let today = self.tracker.today();
        let mut cells = vec![
            Cell::from("Metric"),
            Cell::from(ThresholdKind::Target.label()),
            Cell::from(ThresholdKind::Limit.label()),
        ];
        cells.extend(dates.iter().map(|&date| {
            let style = if date == today {
                TODAY_STYLE
            } else {
                HEADER_STYLE
            };
            Cell::from(Text::from(vec![
                Line::from(date.weekday_label()),
                Line::from(date.short_label()),
            ]))
            .style(style)
        }));
        Row::new(cells).height(2).style(HEADER_STYLE)
    }

    fn metric_row(
        &self,
        metric: &Metric,
        dates: &[CalendarDate],
        date_offset: usize,
        cursor: Option<Column>,
    ) -> Row<'static> {
        let sheet = self.tracker.sheet();
        let ratings = self.tracker.ratings();
        let mark = |style: Style, column: Column| {
            if cursor == Some(column) {
                style.add_modifier(CURSOR_MODIFIER)
            } else {
                style
            }
        };
        let arrow = if metric.config.higher_is_better {
            '↑'
        } else {
            '↓'
        };
        let mut cells = vec![Cell::from(format!("{arrow} {}", metric.name))
            .style(mark(BASE_STYLE, Column::Name))];
        for kind in [ThresholdKind::Target, ThresholdKind::Limit] {
            cells.push(
                Cell::from(sheet.threshold(&metric.id, kind).to_owned())
                    .style(mark(THRESHOLD_STYLE, Column::Threshold(kind))),
            );
        }
        cells.extend(dates.iter().enumerate().map(|(i, &date)| {
            let style = rating_style(ratings.get(date, &metric.id));
            Cell::from(sheet.value(date, &metric.id).to_owned())
                .style(mark(style, Column::Date(date_offset + i)))
        }));
        Row::new(cells)
    }

    fn footer(&self, dates: &[CalendarDate]) -> Row<'static> {
        let mut cells = vec![Cell::from("Score"), Cell::default(), Cell::default()];
        cells.extend(dates.iter().map(|&date| {
            let score = self.tracker.score(date);
            Cell::from(score.label()).style(score_style(score.band()))
        }));
        Row::new(cells).style(HEADER_STYLE)
    }
}

impl<S: Storage> StatefulWidget for Grid<'_, S> {
    type State = GridState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let window = self.tracker.window();
        let metrics = self.tracker.metrics();
        state.clamp(metrics.len(), window.len());
        let date_columns = usize::from(
            area.width.saturating_sub(FIXED_WIDTH) / (DATE_WIDTH + SPACING),
        )
        .clamp(1, window.len().max(1));
        let body_rows = usize::from(area.height.saturating_sub(CHROME_HEIGHT)).max(1);
        state.scroll_into_view(body_rows, window.len(), date_columns);

        let dates = window
            .iter()
            .skip(state.date_offset)
            .take(date_columns)
            .collect::<Vec<_>>();
        let rows = if metrics.is_empty() {
            vec![Row::new([Cell::from("No metrics; press a to add one")])]
        } else {
            metrics
                .iter()
                .enumerate()
                .skip(state.row_offset)
                .take(body_rows)
                .map(|(i, metric)| {
                    let cursor = (i == state.row).then(|| state.column());
                    self.metric_row(metric, &dates, state.date_offset, cursor)
                })
                .collect::<Vec<_>>()
        };
        let mut widths = vec![
            Constraint::Length(NAME_WIDTH),
            Constraint::Length(THRESHOLD_WIDTH),
            Constraint::Length(THRESHOLD_WIDTH),
        ];
        widths.extend(dates.iter().map(|_| Constraint::Length(DATE_WIDTH)));
        let table = Table::new(rows, widths)
            .header(self.header(&dates))
            .footer(self.footer(&dates))
            .column_spacing(SPACING)
            .style(BASE_STYLE);
        Widget::render(table, area, buf);
    }
}
