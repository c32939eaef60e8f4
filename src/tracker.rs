use crate::calendar::{CalendarDate, DateWindow, FutureBoundError, Navigator, ViewMode};
use crate::model::{MetricId, MetricList, Rating, RatingBook, SleepData, ThresholdKind};
use crate::score::{compute_daily_scores, DailyScore};
use crate::store::{Persisted, Storage, METRICS_KEY, RATINGS_KEY, SLEEP_DATA_KEY};
use std::collections::BTreeMap;

/// A running session: the store, everything loaded from it, where the grid
/// is on the calendar, and the scores of the visible dates
#[derive(Debug)]
pub(crate) struct Tracker<S> {
    store: S,
    metrics: Persisted<MetricList>,
    sheet: Persisted<SleepData>,
    ratings: Persisted<RatingBook>,
    navigator: Navigator,
    scores: BTreeMap<CalendarDate, DailyScore>,
}

impl<S: Storage> Tracker<S> {
    pub(crate) fn new(mut store: S, navigator: Navigator) -> Tracker<S> {
        let metrics = Persisted::load(&mut store, METRICS_KEY);
        let sheet = Persisted::load(&mut store, SLEEP_DATA_KEY);
        let ratings = Persisted::load(&mut store, RATINGS_KEY);
        let mut tracker = Tracker {
            store,
            metrics,
            sheet,
            ratings,
            navigator,
            scores: BTreeMap::new(),
        };
        tracker.recompute();
        tracker
    }

    fn recompute(&mut self) {
        self.scores = compute_daily_scores(&self.navigator.window(), self.ratings.get());
    }

    fn navigated(&mut self) {
        let window = self.navigator.window();
        tracing::debug!(
            mode = %self.navigator.mode(),
            anchor = %self.navigator.anchor(),
            first = %window.first(),
            last = %window.last(),
            "window changed"
        );
        self.recompute();
    }

    pub(crate) fn metrics(&self) -> &MetricList {
        self.metrics.get()
    }

    pub(crate) fn sheet(&self) -> &SleepData {
        self.sheet.get()
    }

    pub(crate) fn ratings(&self) -> &RatingBook {
        self.ratings.get()
    }

    pub(crate) fn window(&self) -> DateWindow {
        self.navigator.window()
    }

    pub(crate) fn mode(&self) -> ViewMode {
        self.navigator.mode()
    }

    pub(crate) fn today(&self) -> CalendarDate {
        self.navigator.today()
    }

    pub(crate) fn score(&self, date: CalendarDate) -> DailyScore {
        self.scores.get(&date).copied().unwrap_or(DailyScore::NoData)
    }

    pub(crate) fn previous_period(&mut self) {
        self.navigator.one_period_backwards();
        self.navigated();
    }

    /// Fails without changing anything if the next period would start after
    /// today
    pub(crate) fn next_period(&mut self) -> Result<(), FutureBoundError> {
        self.navigator.one_period_forwards()?;
        self.navigated();
        Ok(())
    }

    pub(crate) fn current_period(&mut self) {
        self.navigator.jump_to_today();
        self.navigated();
    }

    pub(crate) fn jump_to(&mut self, date: CalendarDate) {
        self.navigator.jump_to_date(date);
        self.navigated();
    }

    pub(crate) fn set_view_mode(&mut self, mode: ViewMode) {
        self.navigator.switch_view_mode(mode);
        self.navigated();
    }

    pub(crate) fn set_value(&mut self, date: CalendarDate, metric: &MetricId, value: &str) {
        let sheet = self.sheet.get().with_value(date, metric, value);
        self.sheet.replace(&mut self.store, sheet);
    }

    pub(crate) fn set_threshold(&mut self, metric: &MetricId, kind: ThresholdKind, value: &str) {
        let sheet = self.sheet.get().with_threshold(metric, kind, value);
        self.sheet.replace(&mut self.store, sheet);
    }

    /// Advances the cell's rating one step and returns the new rating
    pub(crate) fn cycle_rating(&mut self, date: CalendarDate, metric: &MetricId) -> Rating {
        let rating = self.ratings.get().get(date, metric).cycled();
        let book = self.ratings.get().with_rating(date, metric, rating);
        self.ratings.replace(&mut self.store, book);
        self.recompute();
        rating
    }

    pub(crate) fn add_metric(&mut self) {
        let metrics = self.metrics.get().with_new_metric();
        self.metrics.replace(&mut self.store, metrics);
    }

    pub(crate) fn rename_metric(&mut self, index: usize, name: &str) {
        let metrics = self.metrics.get().renamed(index, name);
        self.metrics.replace(&mut self.store, metrics);
    }

    /// Removes the row only; values and ratings recorded for it stay stored
    pub(crate) fn delete_metric(&mut self, index: usize) {
        let metrics = self.metrics.get().without(index);
        self.metrics.replace(&mut self.store, metrics);
    }

    /// Returns `false` if the metric is already first
    pub(crate) fn move_metric_up(&mut self, index: usize) -> bool {
        index > 0 && self.move_metric(index, index - 1)
    }

    /// Returns `false` if the metric is already last
    pub(crate) fn move_metric_down(&mut self, index: usize) -> bool {
        self.move_metric(index, index + 1)
    }

    fn move_metric(&mut self, from: usize, to: usize) -> bool {
        if let Some(metrics) = self.metrics.get().swapped(from, to) {
            self.metrics.replace(&mut self.store, metrics);
            true
        } else {
            false
        }
    }

    /// Picks up writes made by other holders of the store and refreshes the
    /// scores.  Returns whether anything was reloaded.
    pub(crate) fn sync(&mut self) -> bool {
        self.store.poll_external();
        let metrics = self.metrics.sync(&self.store);
        let sheet = self.sheet.sync(&self.store);
        let ratings = self.ratings.sync(&self.store);
        if ratings {
            self.recompute();
        }
        metrics || sheet || ratings
    }
}
