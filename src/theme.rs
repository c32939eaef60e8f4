use crate::model::Rating;
use crate::score::ScoreBand;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) mod grid {
    use super::*;

    pub(crate) const HEADER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

    pub(crate) const TODAY_STYLE: Style = Style::new()
        .fg(Color::LightYellow)
        .bg(Color::Black)
        .add_modifier(Modifier::BOLD);

    pub(crate) const THRESHOLD_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const CURSOR_MODIFIER: Modifier = Modifier::REVERSED;

    pub(crate) const fn rating_style(rating: Rating) -> Style {
        match rating {
            Rating::Unset => BASE_STYLE,
            Rating::Good => Style::new().fg(Color::Black).bg(Color::Green),
            Rating::Warning => Style::new().fg(Color::Black).bg(Color::Yellow),
            Rating::Bad => Style::new().fg(Color::White).bg(Color::Red),
        }
    }

    pub(crate) const fn score_style(band: Option<ScoreBand>) -> Style {
        match band {
            None => BASE_STYLE.fg(Color::DarkGray),
            Some(ScoreBand::Good) => BASE_STYLE.fg(Color::LightGreen).add_modifier(Modifier::BOLD),
            Some(ScoreBand::Fair) => BASE_STYLE.fg(Color::LightYellow).add_modifier(Modifier::BOLD),
            Some(ScoreBand::Poor) => BASE_STYLE.fg(Color::LightRed).add_modifier(Modifier::BOLD),
        }
    }
}

pub(crate) mod jumpto {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}

pub(crate) mod editor {
    use super::*;

    pub(crate) const HINT_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const CURSOR_STYLE: Style = BASE_STYLE.add_modifier(Modifier::SLOW_BLINK);
}
