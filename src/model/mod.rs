//! What the user records: metric rows, cell values with thresholds, and cell
//! ratings.  Each type is an immutable snapshot; edits produce a new value.
mod metric;
mod rating;
mod sheet;
pub(crate) use self::metric::{Metric, MetricId, MetricList};
pub(crate) use self::rating::{Rating, RatingBook};
pub(crate) use self::sheet::{SleepData, ThresholdKind};
