use crate::calendar::ViewMode;
use crate::editor::{EditInput, EditOutput, EditTarget, Editor, EditorState};
use crate::export::export_to_dir;
use crate::grid::{Column, Grid, GridState};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::model::Rating;
use crate::store::Storage;
use crate::theme::{BASE_STYLE, STATUS_STYLE, TITLE_STYLE};
use crate::tracker::Tracker;
use crossterm::event::{poll, read, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// How long to wait for input before checking the store for outside changes
const TICK: Duration = Duration::from_millis(500);

const DEFAULT_STATUS: &str = "Press ? for help";

#[derive(Debug)]
pub(crate) struct App<S> {
    tracker: Tracker<S>,
    grid: GridState,
    state: AppState,
    status: String,
    export_dir: PathBuf,
}

impl<S: Storage> App<S> {
    pub(crate) fn new(tracker: Tracker<S>, export_dir: PathBuf) -> App<S> {
        App {
            tracker,
            grid: GridState::new(),
            state: AppState::Browsing,
            status: String::from(DEFAULT_STATUS),
            export_dir,
        }
    }

    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            if poll(TICK)? {
                self.handle_input()?;
            } else if self.tracker.sync() {
                self.status = String::from("Reloaded changes made elsewhere");
            }
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = read()?.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match &mut self.state {
            AppState::Browsing => self.handle_browsing_key(key),
            AppState::Helping => {
                self.state = AppState::Browsing;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Browsing;
                    return true;
                }
                let output = match key {
                    KeyCode::Char(c) => c
                        .to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .map_or(JumpToOutput::Invalid, |d| {
                            state.handle_input(JumpToInput::Digit(d))
                        }),
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(JumpToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                    _ => JumpToOutput::Invalid,
                };
                match output {
                    JumpToOutput::Ok => true,
                    JumpToOutput::Invalid => false,
                    JumpToOutput::Jump(date) => {
                        self.state = AppState::Browsing;
                        self.tracker.jump_to(date);
                        self.status = if self.tracker.window().contains(date) {
                            format!("Jumped to {}", date.long_label())
                        } else {
                            format!("{} is in the future; showing today", date.long_label())
                        };
                        true
                    }
                }
            }
            AppState::Editing(state) => {
                let input = match key {
                    KeyCode::Esc => {
                        self.state = AppState::Browsing;
                        return true;
                    }
                    KeyCode::Char(c) => EditInput::Char(c),
                    KeyCode::Backspace => EditInput::Backspace,
                    KeyCode::Delete => EditInput::Clear,
                    KeyCode::Enter => EditInput::Enter,
                    _ => return false,
                };
                match state.handle_input(input) {
                    EditOutput::Ok => true,
                    EditOutput::Invalid => false,
                    EditOutput::Commit(text) => {
                        let target = state.target().clone();
                        self.commit_edit(target, &text)
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    fn handle_browsing_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.grid.move_left(),
            KeyCode::Char('l') | KeyCode::Right => {
                self.grid.move_right(self.tracker.window().len())
            }
            KeyCode::Char('k') | KeyCode::Up => self.grid.move_up(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.grid.move_down(self.tracker.metrics().len())
            }
            KeyCode::Char('[') | KeyCode::PageUp => {
                self.tracker.previous_period();
                self.show_window();
                true
            }
            KeyCode::Char(']') | KeyCode::PageDown => match self.tracker.next_period() {
                Ok(()) => {
                    self.show_window();
                    true
                }
                Err(e) => {
                    self.status = format!("Not moving: {e}");
                    false
                }
            },
            KeyCode::Char('0') | KeyCode::Home => {
                self.tracker.current_period();
                self.show_window();
                true
            }
            KeyCode::Char('g') => {
                self.state = AppState::Jumping(JumpToState::new());
                true
            }
            KeyCode::Char('v') => self.set_view_mode(self.tracker.mode().next()),
            KeyCode::Char('1') => self.set_view_mode(ViewMode::Week),
            KeyCode::Char('2') => self.set_view_mode(ViewMode::Biweek),
            KeyCode::Char('3') => self.set_view_mode(ViewMode::Month),
            KeyCode::Char(' ') => self.cycle_rating(),
            KeyCode::Enter => self.start_edit(),
            KeyCode::Char('a') => {
                self.tracker.add_metric();
                let row = self.tracker.metrics().len().saturating_sub(1);
                self.grid.select_row(row);
                self.status = String::from("Added a metric; press ENTER to name it");
                true
            }
            KeyCode::Char('x') => self.delete_metric(),
            KeyCode::Char('K') => {
                let row = self.grid.row();
                let moved = self.tracker.move_metric_up(row);
                if moved {
                    self.grid.select_row(row - 1);
                }
                moved
            }
            KeyCode::Char('J') => {
                let row = self.grid.row();
                let moved = self.tracker.move_metric_down(row);
                if moved {
                    self.grid.select_row(row + 1);
                }
                moved
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            _ => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")?;
        io::stdout().flush()
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn show_window(&mut self) {
        let window = self.tracker.window();
        self.status = format!(
            "Showing {} to {}",
            window.first().long_label(),
            window.last().long_label()
        );
    }

    fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        self.tracker.set_view_mode(mode);
        self.show_window();
        true
    }

    fn cycle_rating(&mut self) -> bool {
        let Column::Date(i) = self.grid.column() else {
            return false;
        };
        let Some(date) = self.tracker.window().get(i) else {
            return false;
        };
        let Some(metric) = self.tracker.metrics().get(self.grid.row()).cloned() else {
            return false;
        };
        let rating = self.tracker.cycle_rating(date, &metric.id);
        self.status = match rating {
            Rating::Unset => format!("Cleared rating of {}, {}", metric.name, date.short_label()),
            Rating::Good => format!("Rated {}, {} good", metric.name, date.short_label()),
            Rating::Warning => format!("Rated {}, {} warning", metric.name, date.short_label()),
            Rating::Bad => format!("Rated {}, {} bad", metric.name, date.short_label()),
        };
        true
    }

    fn start_edit(&mut self) -> bool {
        let row = self.grid.row();
        let Some(metric) = self.tracker.metrics().get(row) else {
            return false;
        };
        let sheet = self.tracker.sheet();
        let editor = match self.grid.column() {
            Column::Name => EditorState::new(
                EditTarget::Name(row),
                String::from("Metric name"),
                "any text",
                &metric.name,
            ),
            Column::Threshold(kind) => EditorState::new(
                EditTarget::Threshold(metric.id.clone(), kind),
                format!("{} {}", metric.name, kind.label().to_lowercase()),
                metric.config.kind.hint(),
                sheet.threshold(&metric.id, kind),
            ),
            Column::Date(i) => {
                let Some(date) = self.tracker.window().get(i) else {
                    return false;
                };
                EditorState::new(
                    EditTarget::Value(date, metric.id.clone()),
                    format!("{}, {}", metric.name, date.long_label()),
                    metric.config.kind.hint(),
                    sheet.value(date, &metric.id),
                )
            }
        };
        self.state = AppState::Editing(editor);
        true
    }

    fn commit_edit(&mut self, target: EditTarget, text: &str) -> bool {
        match target {
            // A metric needs a name to be shown by
            EditTarget::Name(_) if text.is_empty() => return false,
            EditTarget::Name(row) => self.tracker.rename_metric(row, text),
            EditTarget::Threshold(id, kind) => self.tracker.set_threshold(&id, kind, text),
            EditTarget::Value(date, id) => self.tracker.set_value(date, &id, text),
        }
        self.state = AppState::Browsing;
        self.status = String::from("Saved");
        true
    }

    fn delete_metric(&mut self) -> bool {
        let row = self.grid.row();
        let Some(name) = self.tracker.metrics().get(row).map(|m| m.name.clone()) else {
            return false;
        };
        self.tracker.delete_metric(row);
        self.grid.clamp(self.tracker.metrics().len(), self.tracker.window().len());
        self.status = format!("Deleted {name}");
        true
    }

    fn export(&mut self) -> bool {
        let window = self.tracker.window();
        match export_to_dir(
            &self.export_dir,
            &window,
            self.tracker.metrics(),
            self.tracker.sheet(),
        ) {
            Ok(path) => {
                self.status = format!("Exported {}", path.display());
                true
            }
            Err(e) => {
                tracing::error!(error = ?e, "export failed");
                self.status = format!("Export failed: {e:#}");
                false
            }
        }
    }
}

impl<S: Storage> Widget for &mut App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [title_area, nav_area, grid_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);
        Line::styled("Sleep Tracker", TITLE_STYLE).render(title_area, buf);
        let window = self.tracker.window();
        Line::from_iter([
            Span::styled(format!("[{}] ", self.tracker.mode().label()), TITLE_STYLE),
            Span::styled(
                format!(
                    "{} - {}",
                    window.first().long_label(),
                    window.last().long_label()
                ),
                BASE_STYLE,
            ),
        ])
        .render(nav_area, buf);
        Grid::new(&self.tracker).render(grid_area, buf, &mut self.grid);
        Line::styled(self.status.as_str(), STATUS_STYLE).render(status_area, buf);
        match self.state {
            AppState::Helping => Help.render(area, buf),
            AppState::Jumping(ref mut state) => JumpTo.render(area, buf, state),
            AppState::Editing(ref mut state) => Editor.render(area, buf, state),
            AppState::Browsing | AppState::Quitting => (),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Browsing,
    Helping,
    Jumping(JumpToState),
    Editing(EditorState),
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarDate, Navigator};
    use crate::model::MetricId;
    use crate::score::DailyScore;
    use crate::store::memory::MemoryStore;
    use time::macros::date;

    const TODAY: CalendarDate = CalendarDate::new(date!(2024 - 06 - 12));

    fn cd(date: time::Date) -> CalendarDate {
        CalendarDate::new(date)
    }

    fn app() -> App<MemoryStore> {
        let tracker = Tracker::new(MemoryStore::new(), Navigator::new(TODAY, ViewMode::Week));
        App::new(tracker, PathBuf::from("."))
    }

    fn press(app: &mut App<MemoryStore>, keys: &str) {
        for c in keys.chars() {
            assert!(app.handle_key(KeyCode::Char(c)), "key {c:?} was rejected");
        }
    }

    fn screen(app: &mut App<MemoryStore>) -> Vec<String> {
        let area = Rect::new(0, 0, 100, 20);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_initial_screen() {
        let mut app = app();
        let lines = screen(&mut app);
        assert_eq!(lines[0].trim_end(), "Sleep Tracker");
        assert_eq!(lines[1].trim_end(), "[Week] Jun 9, 2024 - Jun 15, 2024");
        assert!(lines[3].starts_with("Metric"));
        assert!(lines[5].starts_with("↓ Bedtime"));
        assert!(lines[18].starts_with("Score"));
        assert_eq!(lines[19].trim_end(), DEFAULT_STATUS);
    }

    #[test]
    fn test_period_navigation() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char(']')));
        assert_eq!(app.status, "Not moving: cannot navigate past today");
        assert!(app.handle_key(KeyCode::PageUp));
        assert_eq!(app.tracker.window().first(), cd(date!(2024 - 06 - 02)));
        press(&mut app, "[");
        assert_eq!(app.tracker.window().first(), cd(date!(2024 - 05 - 26)));
        assert!(app.handle_key(KeyCode::Char(']')));
        assert_eq!(app.tracker.window().first(), cd(date!(2024 - 06 - 02)));
        // The current week ends after today, so only HOME gets back to it
        assert!(!app.handle_key(KeyCode::PageDown));
        press(&mut app, "0");
        assert_eq!(app.tracker.window().first(), cd(date!(2024 - 06 - 09)));
    }

    #[test]
    fn test_biweek_navigation_back_to_today() {
        let mut app = app();
        press(&mut app, "2[");
        assert_eq!(app.tracker.window().last(), cd(date!(2024 - 06 - 11)));
        // A step forward from here would start on today
        assert!(!app.handle_key(KeyCode::Char(']')));
        assert_eq!(app.tracker.window().last(), cd(date!(2024 - 06 - 11)));
        press(&mut app, "0");
        assert_eq!(app.tracker.window().last(), TODAY);
        assert_eq!(app.tracker.mode(), ViewMode::Biweek);
    }

    #[test]
    fn test_view_modes() {
        let mut app = app();
        press(&mut app, "v");
        assert_eq!(app.tracker.mode(), ViewMode::Biweek);
        press(&mut app, "3");
        assert_eq!(app.tracker.window().len(), 30);
        assert_eq!(app.tracker.window().last(), TODAY);
        press(&mut app, "1");
        assert_eq!(app.tracker.mode(), ViewMode::Week);
    }

    #[test]
    fn test_rate_cells() {
        let mut app = app();
        // The name column cannot be rated
        assert!(!app.handle_key(KeyCode::Char(' ')));
        press(&mut app, "llllll");
        assert_eq!(app.grid.column(), Column::Date(3));
        press(&mut app, " ");
        assert_eq!(app.status, "Rated Bedtime, Jun 12 good");
        press(&mut app, "j  ");
        assert_eq!(app.status, "Rated Wake Time, Jun 12 warning");
        assert_eq!(app.tracker.score(TODAY), DailyScore::Scored(0.75));
    }

    #[test]
    fn test_edit_value() {
        let mut app = app();
        press(&mut app, "llll");
        assert!(app.handle_key(KeyCode::Enter));
        assert!(matches!(app.state, AppState::Editing(_)));
        let lines = screen(&mut app);
        assert!(lines.iter().any(|l| l.contains("Bedtime, Jun 10, 2024")));
        press(&mut app, "23:40");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Browsing);
        let id = MetricId::new("bedtime");
        let date = cd(date!(2024 - 06 - 10));
        assert_eq!(app.tracker.sheet().value(date, &id), "23:40");
    }

    #[test]
    fn test_edit_threshold_and_cancel() {
        let mut app = app();
        press(&mut app, "l");
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.handle_key(KeyCode::Delete));
        press(&mut app, "21:45");
        assert!(app.handle_key(KeyCode::Esc));
        let id = MetricId::new("bedtime");
        assert_eq!(
            app.tracker.sheet().threshold(&id, crate::model::ThresholdKind::Target),
            "22:00"
        );
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.handle_key(KeyCode::Delete));
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(matches!(app.state, AppState::Editing(_)));
    }

    #[test]
    fn test_metric_management() {
        let mut app = app();
        press(&mut app, "a");
        assert_eq!(app.grid.row(), 10);
        assert!(app.handle_key(KeyCode::Enter));
        assert!(app.handle_key(KeyCode::Delete));
        press(&mut app, "Naps");
        assert!(app.handle_key(KeyCode::Enter));
        press(&mut app, "K");
        assert_eq!(app.grid.row(), 9);
        assert_eq!(
            app.tracker.metrics().get(9).map(|m| m.name.as_str()),
            Some("Naps")
        );
        press(&mut app, "J");
        assert!(!app.handle_key(KeyCode::Char('J')));
        press(&mut app, "x");
        assert_eq!(app.status, "Deleted Naps");
        assert_eq!(app.tracker.metrics().len(), 10);
        assert_eq!(app.grid.row(), 9);
    }

    #[test]
    fn test_jump_dialog() {
        let mut app = app();
        press(&mut app, "g2024060");
        assert!(!app.handle_key(KeyCode::Char('x')));
        press(&mut app, "3");
        let lines = screen(&mut app);
        assert!(lines.iter().any(|l| l.contains("2024-06-03")));
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Browsing);
        assert_eq!(app.tracker.window().first(), cd(date!(2024 - 06 - 02)));
        press(&mut app, "gq");
        assert_eq!(app.state, AppState::Browsing);
    }

    #[test]
    fn test_jump_past_today() {
        let mut app = app();
        press(&mut app, "3g20240701");
        assert!(app.handle_key(KeyCode::Enter));
        assert_eq!(app.tracker.window().last(), TODAY);
        assert_eq!(app.status, "Jul 1, 2024 is in the future; showing today");
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = app();
        press(&mut app, "?");
        let lines = screen(&mut app);
        assert!(lines.iter().any(|l| l.contains(" Keys ")));
        assert!(lines.iter().any(|l| l.contains("Export the window as CSV")));
        assert!(app.handle_key(KeyCode::Char('z')));
        assert_eq!(app.state, AppState::Browsing);
        press(&mut app, "q");
        assert!(app.quitting());
    }

    #[test]
    fn test_export() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let tracker = Tracker::new(MemoryStore::new(), Navigator::new(TODAY, ViewMode::Week));
        let mut app = App::new(tracker, tmp.path().to_path_buf());
        press(&mut app, "e");
        let path = tmp.path().join("sleep_data_2024-06-09_to_2024-06-15.csv");
        assert!(path.is_file());
        assert_eq!(app.status, format!("Exported {}", path.display()));
    }
}
