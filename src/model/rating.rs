use super::MetricId;
use crate::calendar::CalendarDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Qualitative mark on a single cell, independent of the cell's value
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Rating {
    #[default]
    Unset,
    Good,
    Warning,
    Bad,
}

impl Rating {
    /// Unset → Good → Warning → Bad → Unset
    pub(crate) const fn cycled(self) -> Rating {
        match self {
            Rating::Unset => Rating::Good,
            Rating::Good => Rating::Warning,
            Rating::Warning => Rating::Bad,
            Rating::Bad => Rating::Unset,
        }
    }
}

/// Sparse (date, metric) → rating store.  A missing entry reads as
/// [`Rating::Unset`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct RatingBook(BTreeMap<CalendarDate, BTreeMap<MetricId, Rating>>);

impl RatingBook {
    pub(crate) fn get(&self, date: CalendarDate, metric: &MetricId) -> Rating {
        self.0
            .get(&date)
            .and_then(|day| day.get(metric))
            .copied()
            .unwrap_or_default()
    }

    /// Every rating recorded for `date`, across all metrics
    pub(crate) fn on(&self, date: CalendarDate) -> impl Iterator<Item = Rating> + '_ {
        self.0.get(&date).into_iter().flat_map(|day| day.values().copied())
    }

    /// Returns a copy with the cell set.  Setting [`Rating::Unset`] drops the
    /// entry rather than storing it.
    pub(crate) fn with_rating(
        &self,
        date: CalendarDate,
        metric: &MetricId,
        rating: Rating,
    ) -> RatingBook {
        let mut book = self.0.clone();
        if rating == Rating::Unset {
            if let Some(day) = book.get_mut(&date) {
                day.remove(metric);
                if day.is_empty() {
                    book.remove(&date);
                }
            }
        } else {
            book.entry(date)
                .or_default()
                .insert(metric.clone(), rating);
        }
        RatingBook(book)
    }
}
