use crate::calendar::{CalendarDate, DateWindow};
use crate::model::{Rating, RatingBook};
use std::collections::BTreeMap;

/// Aggregate of one day's ratings
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DailyScore {
    NoData,
    /// Always within `0.0..=1.0`
    Scored(f64),
}

impl DailyScore {
    pub(crate) fn band(self) -> Option<ScoreBand> {
        match self {
            DailyScore::NoData => None,
            DailyScore::Scored(s) => Some(ScoreBand::for_score(s)),
        }
    }

    /// `85%`, or `-` for no data
    pub(crate) fn label(self) -> String {
        match self {
            DailyScore::NoData => String::from("-"),
            DailyScore::Scored(s) => format!("{:.0}%", (s * 100.0).round()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    fn for_score(score: f64) -> ScoreBand {
        if score >= 0.8 {
            ScoreBand::Good
        } else if score >= 0.5 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Tally {
    bad: u32,
    warning: u32,
    total: u32,
}

impl Tally {
    fn add(mut self, rating: Rating) -> Tally {
        match rating {
            Rating::Bad => self.bad += 1,
            Rating::Warning => self.warning += 1,
            Rating::Good | Rating::Unset => (),
        }
        self.total += 1;
        self
    }

    fn score(self) -> DailyScore {
        if self.total == 0 {
            return DailyScore::NoData;
        }
        let penalty = f64::from(self.bad) + f64::from(self.warning) / 2.0;
        DailyScore::Scored(1.0 - penalty / f64::from(self.total))
    }
}

/// Scores every date of `window`: a Bad rating costs a full point, a Warning
/// half a point, averaged over all ratings recorded that day.
pub(crate) fn compute_daily_scores(
    window: &DateWindow,
    ratings: &RatingBook,
) -> BTreeMap<CalendarDate, DailyScore> {
    window
        .iter()
        .map(|date| {
            let tally = ratings.on(date).fold(Tally::default(), Tally::add);
            (date, tally.score())
        })
        .collect()
}
