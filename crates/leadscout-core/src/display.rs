//! Visible-window math for incremental result reveal.
//!
//! The canonical result set can be far larger than what the presentation
//! layer wants to render at once. These functions derive a bounded prefix
//! of the set without refetching anything: the window only ever grows, and
//! only a fresh search shrinks it (by calling [`reset`] on the new set).

/// Returns the initial window over `set`: the first `page_size` items.
#[must_use]
pub fn reset<T>(set: &[T], page_size: usize) -> &[T] {
    &set[..page_size.min(set.len())]
}

/// Grows the window by one page and reports whether everything is visible.
///
/// Returns the first `min(current_len + page_size, |set|)` items along with
/// an `all_shown` flag. Growth is monotonic: the returned window is never
/// shorter than `current_len` clamped to the set length, so callers can
/// feed the previous window length back in regardless of whether the set
/// itself grew in the meantime.
#[must_use]
pub fn show_more<T>(set: &[T], current_len: usize, page_size: usize) -> (&[T], bool) {
    let new_len = current_len.saturating_add(page_size).min(set.len());
    (&set[..new_len], new_len == set.len())
}
