use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct MetricId(String);

impl MetricId {
    pub(crate) fn new<S: Into<String>>(id: S) -> MetricId {
        MetricId(id.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MetricKind {
    Number,
    Time,
    Score,
}

impl MetricKind {
    /// Hint shown while editing a value of this kind
    pub(crate) const fn hint(self) -> &'static str {
        match self {
            MetricKind::Number => "number",
            MetricKind::Time => "time, e.g. 22:30",
            MetricKind::Score => "score, e.g. 85",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetricConfig {
    #[serde(rename = "type")]
    pub(crate) kind: MetricKind,
    pub(crate) higher_is_better: bool,
}

/// A row of the sleep grid
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub(crate) struct Metric {
    pub(crate) id: MetricId,
    pub(crate) name: String,
    pub(crate) config: MetricConfig,
}

impl Metric {
    fn new(id: &str, name: &str, kind: MetricKind, higher_is_better: bool) -> Metric {
        Metric {
            id: MetricId::new(id),
            name: name.to_owned(),
            config: MetricConfig {
                kind,
                higher_is_better,
            },
        }
    }
}

/// The ordered list of metrics shown as grid rows.
///
/// Every editing method returns a new list and leaves `self` untouched.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct MetricList(Vec<Metric>);

impl Default for MetricList {
    fn default() -> MetricList {
        use MetricKind::{Score, Time};
        MetricList(vec![
            Metric::new("bedtime", "Bedtime", Time, false),
            Metric::new("waketime", "Wake Time", Time, true),
            Metric::new("totalSleep", "Total Sleep", Time, true),
            Metric::new("avgSleepApple", "7 Day Avg Sleep (apple)", Time, true),
            Metric::new("ouraSleepScore", "Oura Sleep Score", Score, true),
            Metric::new("ouraReadiness", "Oura Readiness Score", Score, true),
            Metric::new("whoopRecovery", "Whoop Recovery", Score, true),
            Metric::new("ouraActivity", "Oura Activity Score", Score, true),
            Metric::new("naturalSleepRange", "\"Natural Sleep Range\"", Time, true),
            Metric::new("sleepConsistency", "Sleep Consistency (whoop)", Score, true),
        ])
    }
}

impl MetricList {
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Metric> {
        self.0.get(index)
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Metric> {
        self.0.iter()
    }

    fn contains_id(&self, id: &str) -> bool {
        self.0.iter().any(|m| m.id.as_str() == id)
    }

    // `metric_<n>` with `n` counting up from one past the current length,
    // skipping numbers already taken (possible after deletions)
    fn fresh_id(&self) -> MetricId {
        let mut n = self.0.len() + 1;
        loop {
            let candidate = format!("metric_{n}");
            if !self.contains_id(&candidate) {
                return MetricId(candidate);
            }
            n += 1;
        }
    }

    pub(crate) fn with_new_metric(&self) -> MetricList {
        let mut metrics = self.0.clone();
        metrics.push(Metric {
            id: self.fresh_id(),
            name: String::from("New Metric"),
            config: MetricConfig {
                kind: MetricKind::Number,
                higher_is_better: true,
            },
        });
        MetricList(metrics)
    }

    pub(crate) fn renamed(&self, index: usize, name: &str) -> MetricList {
        let mut metrics = self.0.clone();
        if let Some(m) = metrics.get_mut(index) {
            name.trim().clone_into(&mut m.name);
        }
        MetricList(metrics)
    }

    pub(crate) fn without(&self, index: usize) -> MetricList {
        let mut metrics = self.0.clone();
        if index < metrics.len() {
            metrics.remove(index);
        }
        MetricList(metrics)
    }

    /// Returns `None` if there is nothing to swap with
    pub(crate) fn swapped(&self, a: usize, b: usize) -> Option<MetricList> {
        if a == b || a >= self.0.len() || b >= self.0.len() {
            return None;
        }
        let mut metrics = self.0.clone();
        metrics.swap(a, b);
        Some(MetricList(metrics))
    }
}

impl<'a> IntoIterator for &'a MetricList {
    type Item = &'a Metric;
    type IntoIter = std::slice::Iter<'a, Metric>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
