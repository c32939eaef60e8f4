use super::MetricId;
use crate::calendar::CalendarDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Key of the record holding per-metric thresholds in the stored form
const TARGET_KEY: &str = "target";

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum ThresholdKind {
    Target,
    Limit,
}

impl ThresholdKind {
    const fn suffix(self) -> &'static str {
        match self {
            ThresholdKind::Target => "_target",
            ThresholdKind::Limit => "_limit",
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        match self {
            ThresholdKind::Target => "Target",
            ThresholdKind::Limit => "Limit",
        }
    }
}

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
struct Thresholds {
    target: String,
    limit: String,
}

impl Thresholds {
    fn get(&self, kind: ThresholdKind) -> &str {
        match kind {
            ThresholdKind::Target => &self.target,
            ThresholdKind::Limit => &self.limit,
        }
    }

    fn get_mut(&mut self, kind: ThresholdKind) -> &mut String {
        match kind {
            ThresholdKind::Target => &mut self.target,
            ThresholdKind::Limit => &mut self.limit,
        }
    }

    fn is_empty(&self) -> bool {
        self.target.is_empty() && self.limit.is_empty()
    }
}

/// The raw values typed into the grid, plus each metric's target and limit.
///
/// Stored as `{ "<date>": { "<metric>": value }, "target": { "<metric>_target":
/// value, "<metric>_limit": value } }`; every other top-level key must be a
/// valid date.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawSheet", into = "RawSheet")]
pub(crate) struct SleepData {
    days: BTreeMap<CalendarDate, BTreeMap<MetricId, String>>,
    thresholds: BTreeMap<MetricId, Thresholds>,
}

impl Default for SleepData {
    fn default() -> SleepData {
        let data = SleepData {
            days: BTreeMap::new(),
            thresholds: BTreeMap::new(),
        };
        [
            ("bedtime", "22:00", "22:30"),
            ("waketime", "06:30", "07:00"),
            ("totalSleep", "8:00", "7:00"),
        ]
        .into_iter()
        .fold(data, |data, (id, target, limit)| {
            let id = MetricId::new(id);
            data.with_threshold(&id, ThresholdKind::Target, target)
                .with_threshold(&id, ThresholdKind::Limit, limit)
        })
    }
}

impl SleepData {
    /// The cell's text, or `""` if nothing was entered
    pub(crate) fn value(&self, date: CalendarDate, metric: &MetricId) -> &str {
        self.days
            .get(&date)
            .and_then(|day| day.get(metric))
            .map_or("", String::as_str)
    }

    pub(crate) fn threshold(&self, metric: &MetricId, kind: ThresholdKind) -> &str {
        self.thresholds.get(metric).map_or("", |t| t.get(kind))
    }

    /// Returns a copy with the cell set; an empty value removes the entry
    pub(crate) fn with_value(&self, date: CalendarDate, metric: &MetricId, value: &str) -> SleepData {
        let mut data = self.clone();
        let value = value.trim();
        if value.is_empty() {
            if let Some(day) = data.days.get_mut(&date) {
                day.remove(metric);
                if day.is_empty() {
                    data.days.remove(&date);
                }
            }
        } else {
            data.days
                .entry(date)
                .or_default()
                .insert(metric.clone(), value.to_owned());
        }
        data
    }

    pub(crate) fn with_threshold(
        &self,
        metric: &MetricId,
        kind: ThresholdKind,
        value: &str,
    ) -> SleepData {
        let mut data = self.clone();
        let entry = data.thresholds.entry(metric.clone()).or_default();
        value.trim().clone_into(entry.get_mut(kind));
        if entry.is_empty() {
            data.thresholds.remove(metric);
        }
        data
    }
}

type RawSheet = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Error)]
pub(crate) enum SheetError {
    #[error("invalid date key {key:?} in sleep data")]
    DateKey {
        key: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("threshold key {0:?} does not end in _target or _limit")]
    ThresholdKey(String),
}

impl TryFrom<RawSheet> for SleepData {
    type Error = SheetError;

    fn try_from(raw: RawSheet) -> Result<SleepData, SheetError> {
        let mut days = BTreeMap::new();
        let mut thresholds = BTreeMap::<MetricId, Thresholds>::new();
        for (key, record) in raw {
            if key == TARGET_KEY {
                for (name, value) in record {
                    let (id, kind) = split_threshold_key(&name)
                        .ok_or_else(|| SheetError::ThresholdKey(name.clone()))?;
                    *thresholds.entry(MetricId::new(id)).or_default().get_mut(kind) = value;
                }
            } else {
                let date = key
                    .parse::<CalendarDate>()
                    .map_err(|source| SheetError::DateKey {
                        key: key.clone(),
                        source,
                    })?;
                let values = record
                    .into_iter()
                    .map(|(id, value)| (MetricId::new(id), value))
                    .collect();
                days.insert(date, values);
            }
        }
        Ok(SleepData { days, thresholds })
    }
}

impl From<SleepData> for RawSheet {
    fn from(data: SleepData) -> RawSheet {
        let mut raw = data
            .days
            .into_iter()
            .map(|(date, values)| {
                let values = values
                    .into_iter()
                    .map(|(id, value)| (id.as_str().to_owned(), value))
                    .collect();
                (date.to_string(), values)
            })
            .collect::<RawSheet>();
        let mut targets = BTreeMap::new();
        for (id, t) in data.thresholds {
            for kind in [ThresholdKind::Target, ThresholdKind::Limit] {
                if !t.get(kind).is_empty() {
                    targets.insert(format!("{id}{}", kind.suffix()), t.get(kind).to_owned());
                }
            }
        }
        raw.insert(TARGET_KEY.to_owned(), targets);
        raw
    }
}

fn split_threshold_key(key: &str) -> Option<(&str, ThresholdKind)> {
    [ThresholdKind::Target, ThresholdKind::Limit]
        .into_iter()
        .find_map(|kind| key.strip_suffix(kind.suffix()).map(|id| (id, kind)))
        .filter(|(id, _)| !id.is_empty())
}
