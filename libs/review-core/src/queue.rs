//! Due-item selection.
//!
//! A review session shows the earliest-due items first. Items due at the same
//! instant keep their creation order.

use chrono::{DateTime, Utc};

use crate::types::ReviewState;

/// Anything that can sit in a review queue.
pub trait DueItem {
    /// When the item becomes due.
    fn next_review_date(&self) -> DateTime<Utc>;

    /// Creation order, used to break ties between equal due dates.
    fn sequence(&self) -> i64;

    /// Whether the item is due at `as_of`.
    fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_date() <= as_of
    }
}

/// Items due at `as_of`, earliest first, at most `limit` of them.
pub fn due_items<T, I>(items: I, as_of: DateTime<Utc>, limit: usize) -> Vec<T>
where
    T: DueItem,
    I: IntoIterator<Item = T>,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut due: Vec<T> = items
        .into_iter()
        .filter(|item| item.is_due(as_of))
        .collect();
    due.sort_by_key(|item| (item.next_review_date(), item.sequence()));
    due.truncate(limit);
    due
}

/// Number of items due at `as_of`.
pub fn due_count<'a, T, I>(items: I, as_of: DateTime<Utc>) -> usize
where
    T: DueItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .filter(|item| item.is_due(as_of))
        .count()
}

/// Earliest due date strictly after `as_of`, if any item is still waiting.
pub fn next_due_date<'a, T, I>(items: I, as_of: DateTime<Utc>) -> Option<DateTime<Utc>>
where
    T: DueItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .map(|item| item.next_review_date())
        .filter(|date| *date > as_of)
        .min()
}

impl<T: DueItem + ?Sized> DueItem for &T {
    fn next_review_date(&self) -> DateTime<Utc> {
        (**self).next_review_date()
    }

    fn sequence(&self) -> i64 {
        (**self).sequence()
    }
}

/// A bare state has no creation order; the stable sort keeps input order.
impl DueItem for ReviewState {
    fn next_review_date(&self) -> DateTime<Utc> {
        self.next_review_date
    }

    fn sequence(&self) -> i64 {
        0
    }
}
