mod navigator;
mod window;
pub(crate) use self::navigator::{FutureBoundError, Navigator};
pub(crate) use self::window::{DateWindow, ParseViewModeError, ViewMode};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::successors;
use std::str::FromStr;
use time::{macros::format_description, Date, Duration};

/// A day on the calendar, keyed as `YYYY-MM-DD`.
///
/// For years 0 through 9999 the derived ordering agrees with lexicographic
/// ordering of the key.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct CalendarDate(Date);

impl CalendarDate {
    pub(crate) const fn new(date: Date) -> Self {
        CalendarDate(date)
    }

    pub(crate) fn days_after(self, n: i64) -> Self {
        CalendarDate(self.0.saturating_add(Duration::days(n)))
    }

    pub(crate) fn days_before(self, n: i64) -> Self {
        CalendarDate(self.0.saturating_sub(Duration::days(n)))
    }

    /// Number of days from `self` to `other`; negative if `other` is earlier
    pub(crate) fn days_until(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).whole_days()
    }

    pub(crate) fn sunday_on_or_before(self) -> Self {
        self.days_before(self.0.weekday().number_days_from_sunday().into())
    }

    fn next_day(self) -> Option<Self> {
        self.0.next_day().map(CalendarDate)
    }

    /// Iterates from `self` through `last` inclusive
    pub(crate) fn iter_through(self, last: CalendarDate) -> impl Iterator<Item = CalendarDate> {
        successors(Some(self), |d| d.next_day()).take_while(move |&d| d <= last)
    }

    /// `Jun 9, 2024`
    pub(crate) fn long_label(self) -> String {
        self.0
            .format(format_description!(
                "[month repr:short] [day padding:none], [year]"
            ))
            .unwrap_or_else(|_| self.to_string())
    }

    /// `Jun 9`
    pub(crate) fn short_label(self) -> String {
        self.0
            .format(format_description!("[month repr:short] [day padding:none]"))
            .unwrap_or_else(|_| self.to_string())
    }

    /// `Sun`
    pub(crate) fn weekday_label(self) -> String {
        self.0
            .format(format_description!("[weekday repr:short]"))
            .unwrap_or_default()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for CalendarDate {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<CalendarDate, time::error::Parse> {
        Date::parse(s, format_description!("[year]-[month]-[day]")).map(CalendarDate)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<CalendarDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<CalendarDate>()
            .map_err(|e| de::Error::custom(format!("invalid date key {s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_display_and_parse() {
        let d = CalendarDate::new(date!(2024 - 06 - 09));
        assert_eq!(d.to_string(), "2024-06-09");
        assert_eq!("2024-06-09".parse::<CalendarDate>().ok(), Some(d));
        assert!("2024-6-9".parse::<CalendarDate>().is_err());
        assert!("2024-02-30".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn test_key_order_matches_date_order() {
        let a = CalendarDate::new(date!(2023 - 12 - 31));
        let b = CalendarDate::new(date!(2024 - 01 - 01));
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_sunday_on_or_before() {
        let wed = CalendarDate::new(date!(2024 - 06 - 12));
        assert_eq!(
            wed.sunday_on_or_before(),
            CalendarDate::new(date!(2024 - 06 - 09))
        );
        let sun = CalendarDate::new(date!(2024 - 06 - 09));
        assert_eq!(sun.sunday_on_or_before(), sun);
        let sat = CalendarDate::new(date!(2024 - 06 - 15));
        assert_eq!(
            sat.sunday_on_or_before(),
            CalendarDate::new(date!(2024 - 06 - 09))
        );
    }

    #[test]
    fn test_arithmetic_across_month_and_leap_day() {
        let d = CalendarDate::new(date!(2024 - 02 - 27));
        assert_eq!(d.days_after(3), CalendarDate::new(date!(2024 - 03 - 01)));
        assert_eq!(
            d.days_after(3).days_before(3),
            d,
            "stepping forward then back should round-trip"
        );
        assert_eq!(d.days_until(d.days_after(30)), 30);
    }

    #[test]
    fn test_labels() {
        let d = CalendarDate::new(date!(2024 - 06 - 09));
        assert_eq!(d.long_label(), "Jun 9, 2024");
        assert_eq!(d.short_label(), "Jun 9");
        assert_eq!(d.weekday_label(), "Sun");
    }

    #[test]
    fn test_serde_as_string() {
        let d = CalendarDate::new(date!(2024 - 06 - 09));
        let json = serde_json::to_string(&d).expect("serialize");
        assert_eq!(json, "\"2024-06-09\"");
        let back: CalendarDate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, d);
        assert!(serde_json::from_str::<CalendarDate>("\"target\"").is_err());
    }
}
