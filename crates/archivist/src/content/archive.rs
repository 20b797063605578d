use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use indexmap::IndexMap;

use crate::content::Post;

/// A calendar month, ordered chronologically.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Returns the month `date` falls in.
    pub fn from_date(date: impl Datelike) -> Option<Self> {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1).map(Self)
    }

    /// Returns the month of a post's publication date, as the post's own
    /// timezone sees it.
    pub fn of_post(post: &Post) -> Self {
        let date = post.date.date_naive();

        Self(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Returns the human-readable form, e.g. `January 2024`.
    pub fn long_name(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Groups posts by the calendar month they were published in.
///
/// Months are ordered newest first. Within a month, posts keep the order they
/// were given in.
pub fn posts_by_year_and_month(posts: &[Post]) -> IndexMap<YearMonth, Vec<&Post>> {
    let mut months = crate::content::group_by(posts, |post| Some(YearMonth::of_post(post)));
    months.sort_by(|a, _, b, _| b.cmp(a));

    months
}
