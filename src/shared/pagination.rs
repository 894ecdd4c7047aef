//! Offset/limit pagination shared by every list query.

use serde::Deserialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u64 = 20;
/// Upper bound on a single page.
pub const MAX_LIMIT: u64 = 100;
/// Largest offset SQL backends can bind without wrapping to a negative value.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Offset/limit window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    pub offset: u64,
    pub limit: u64,
}

impl ListParams {
    /// Build a window, defaulting and clamping the limit to `1..=max_limit`
    /// and the offset to [`MAX_OFFSET`].
    pub fn new(offset: Option<u64>, limit: Option<u64>, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, max_limit);
        Self {
            offset: offset.unwrap_or(0).min(MAX_OFFSET),
            limit,
        }
    }

    /// Whether the window starts at or past the last of `total` matches.
    pub fn is_past(&self, total: u64) -> bool {
        self.offset >= total
    }

    pub(crate) fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the number of matches before pagination.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
