//! Windowed cache over a sequential index space.
//!
//! Tracks which inclusive index ranges of a collection (message positions in
//! a folder) have been fetched. Entries are pairwise disjoint and never
//! adjacent: any `put` that overlaps or touches an entry is merged into it.

use thiserror::Error;

/// Sentinel returned by [`RangeCache::mask`] when nothing needs fetching.
///
/// Ambiguous with a genuine `(0, 0)` miss; callers confirm with
/// [`RangeCache::get`].
pub const FULLY_CACHED: (usize, usize) = (0, 0);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid range: start {start} is after end {end}")]
    InvertedRange { start: usize, end: usize },
    #[error("range {start}..={end} holds {expected} items but {actual} were supplied")]
    LengthMismatch {
        start: usize,
        end: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone)]
struct Entry<T> {
    start: usize,
    end: usize,
    items: Vec<T>,
}

impl<T> Entry<T> {
    /// Whether this entry overlaps or is adjacent to `start..=end`.
    fn touches(&self, start: usize, end: usize) -> bool {
        self.start <= end.saturating_add(1) && self.end.saturating_add(1) >= start
    }
}

/// Cache of item batches keyed by inclusive index ranges.
///
/// The cache only grows; it lives as long as the folder view that owns it.
#[derive(Debug, Clone)]
pub struct RangeCache<T> {
    // Not kept in index order.
    entries: Vec<Entry<T>>,
}

impl<T> Default for RangeCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_range(start: usize, end: usize) -> Result<(), RangeError> {
    if start > end {
        return Err(RangeError::InvertedRange { start, end });
    }
    Ok(())
}

impl<T> RangeCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of disjoint cached ranges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached ranges in index order, as inclusive `(start, end)` pairs.
    pub fn ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges: Vec<_> = self.entries.iter().map(|e| (e.start, e.end)).collect();
        ranges.sort_unstable();
        ranges
    }

    /// Returns the part of `start..=end` that still has to be fetched.
    ///
    /// Only a single missing interval can be reported: when cached entries
    /// leave gaps on both sides of the request, only one side is trimmed.
    /// Returns [`FULLY_CACHED`] when an entry encloses what remains.
    pub fn mask(&self, start: usize, end: usize) -> Result<(usize, usize), RangeError> {
        check_range(start, end)?;

        let (mut start, mut end) = (start, end);
        for entry in &self.entries {
            if !entry.touches(start, end) {
                continue;
            }
            if start < entry.start {
                // An entry strictly inside the request cannot be expressed
                // as one interval, so it is left alone.
                if end <= entry.end {
                    end = entry.start - 1;
                }
            } else if entry.end >= end {
                return Ok(FULLY_CACHED);
            } else {
                start = entry.end + 1;
            }
        }
        Ok((start, end))
    }

    /// Inserts `items` at `start..=end`, merging with every entry it overlaps
    /// or touches. Items from the new batch win where ranges overlap.
    pub fn put(&mut self, start: usize, end: usize, items: Vec<T>) -> Result<(), RangeError> {
        check_range(start, end)?;
        let expected = (end - start).saturating_add(1);
        if items.len() != expected {
            return Err(RangeError::LengthMismatch {
                start,
                end,
                expected,
                actual: items.len(),
            });
        }

        let (mut start, mut end, mut items) = (start, end, items);
        loop {
            let Some(pos) = self.entries.iter().position(|e| e.touches(start, end)) else {
                tracing::trace!(start, end, "cache: inserting range");
                self.entries.push(Entry { start, end, items });
                return Ok(());
            };

            let entry = &mut self.entries[pos];
            if start <= entry.start {
                let old = self.entries.swap_remove(pos);
                if end >= old.end {
                    // New batch encloses the old entry; drop it.
                    continue;
                }
                // New batch precedes the old entry; keep the old tail.
                let tail = end + 1 - old.start;
                items.extend(old.items.into_iter().skip(tail));
                end = old.end;
            } else {
                let head = start - entry.start;
                if entry.end >= end {
                    // Enclosed by the old entry: overwrite the overlap in place.
                    let overlap = head..head + (end - start + 1);
                    entry.items.splice(overlap, items);
                    return Ok(());
                }
                // New batch follows the old entry; keep the old head.
                let old = self.entries.swap_remove(pos);
                let mut merged: Vec<T> = old.items.into_iter().take(head).collect();
                merged.append(&mut items);
                items = merged;
                start = old.start;
            }
            tracing::trace!(start, end, "cache: merged with existing range");
        }
    }

    /// Returns the items for `start..=end` if one entry encloses the range.
    ///
    /// Returns `None` when the range is not cached or straddles an entry
    /// boundary.
    pub fn get(&self, start: usize, end: usize) -> Result<Option<&[T]>, RangeError> {
        check_range(start, end)?;

        for entry in &self.entries {
            if !entry.touches(start, end) {
                continue;
            }
            if start >= entry.start && end <= entry.end {
                let from = start - entry.start;
                return Ok(Some(&entry.items[from..=end - entry.start]));
            }
            return Ok(None);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_get_returns_inserted_items() {
        let mut cache = RangeCache::new();
        cache.put(10, 14, letters("abcde")).unwrap();
        cache.put(20, 22, letters("xyz")).unwrap();

        assert_eq!(cache.get(10, 14).unwrap(), Some(&letters("abcde")[..]));
        assert_eq!(cache.get(11, 13).unwrap(), Some(&letters("bcd")[..]));
        assert_eq!(cache.get(21, 21).unwrap(), Some(&['y'][..]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_get_misses() {
        let mut cache = RangeCache::new();
        assert_eq!(cache.get(0, 3).unwrap(), None);

        cache.put(5, 9, letters("abcde")).unwrap();
        // Straddles the start of the entry
        assert_eq!(cache.get(3, 6).unwrap(), None);
        // Straddles the end of the entry
        assert_eq!(cache.get(8, 12).unwrap(), None);
        // Adjacent but outside
        assert_eq!(cache.get(10, 11).unwrap(), None);
        // Far away
        assert_eq!(cache.get(100, 110).unwrap(), None);
    }

    #[test]
    fn test_put_overlapping_overwrites_with_new_batch() {
        let mut cache = RangeCache::new();
        cache.put(0, 4, letters("ABCDE")).unwrap();
        cache.put(3, 7, letters("VWXYZ")).unwrap();

        assert_eq!(cache.ranges(), vec![(0, 7)]);
        assert_eq!(cache.get(0, 7).unwrap(), Some(&letters("ABCVWXYZ")[..]));
    }

    #[test]
    fn test_put_preceding_keeps_old_tail() {
        let mut cache = RangeCache::new();
        cache.put(4, 8, letters("efghi")).unwrap();
        cache.put(1, 5, letters("BCDEF")).unwrap();

        assert_eq!(cache.ranges(), vec![(1, 8)]);
        assert_eq!(cache.get(1, 8).unwrap(), Some(&letters("BCDEFghi")[..]));
    }

    #[test]
    fn test_put_enclosed_replaces_overlap_only() {
        let mut cache = RangeCache::new();
        cache.put(0, 9, letters("abcdefghij")).unwrap();
        cache.put(3, 5, letters("XYZ")).unwrap();

        assert_eq!(cache.ranges(), vec![(0, 9)]);
        assert_eq!(cache.get(0, 9).unwrap(), Some(&letters("abcXYZghij")[..]));
    }

    #[test]
    fn test_put_enclosing_discards_old_entries() {
        let mut cache = RangeCache::new();
        cache.put(2, 3, letters("cd")).unwrap();
        cache.put(6, 7, letters("gh")).unwrap();
        cache.put(0, 9, letters("ABCDEFGHIJ")).unwrap();

        assert_eq!(cache.ranges(), vec![(0, 9)]);
        assert_eq!(cache.get(0, 9).unwrap(), Some(&letters("ABCDEFGHIJ")[..]));
    }

    #[test]
    fn test_put_merges_adjacent_ranges() {
        let mut cache = RangeCache::new();
        cache.put(0, 2, letters("abc")).unwrap();
        cache.put(6, 8, letters("ghi")).unwrap();
        assert_eq!(cache.len(), 2);

        // Touches both neighbours without overlapping either
        cache.put(3, 5, letters("def")).unwrap();
        assert_eq!(cache.ranges(), vec![(0, 8)]);
        assert_eq!(cache.get(0, 8).unwrap(), Some(&letters("abcdefghi")[..]));
    }

    #[test]
    fn test_put_bridging_two_entries() {
        let mut cache = RangeCache::new();
        cache.put(0, 3, letters("abcd")).unwrap();
        cache.put(8, 11, letters("ijkl")).unwrap();
        cache.put(2, 9, letters("CDEFGHIJ")).unwrap();

        assert_eq!(cache.ranges(), vec![(0, 11)]);
        assert_eq!(cache.get(0, 11).unwrap(), Some(&letters("abCDEFGHIJkl")[..]));
    }

    #[test]
    fn test_entries_stay_disjoint_and_non_adjacent() {
        let mut cache = RangeCache::new();
        let puts = [(5, 9), (20, 24), (0, 2), (12, 14), (3, 4), (10, 11), (15, 19)];
        for (start, end) in puts {
            let items: Vec<usize> = (start..=end).collect();
            cache.put(start, end, items).unwrap();

            let ranges = cache.ranges();
            for pair in ranges.windows(2) {
                assert!(
                    pair[0].1 + 1 < pair[1].0,
                    "ranges {:?} and {:?} should have been merged",
                    pair[0],
                    pair[1]
                );
            }
        }
        assert_eq!(cache.ranges(), vec![(0, 24)]);
        let all: Vec<usize> = (0..=24).collect();
        assert_eq!(cache.get(0, 24).unwrap(), Some(&all[..]));
    }

    #[test]
    fn test_mask_trims_cached_prefix() {
        let mut cache = RangeCache::new();
        cache.put(0, 4, letters("abcde")).unwrap();
        assert_eq!(cache.mask(2, 6).unwrap(), (5, 6));
    }

    #[test]
    fn test_mask_trims_cached_suffix() {
        let mut cache = RangeCache::new();
        cache.put(10, 19, (10..=19).collect::<Vec<usize>>()).unwrap();
        assert_eq!(cache.mask(5, 12).unwrap(), (5, 9));
    }

    #[test]
    fn test_mask_fully_cached() {
        let mut cache = RangeCache::new();
        cache.put(0, 9, (0..=9).collect::<Vec<usize>>()).unwrap();
        assert_eq!(cache.mask(2, 7).unwrap(), FULLY_CACHED);
        assert_eq!(cache.mask(0, 9).unwrap(), FULLY_CACHED);
    }

    #[test]
    fn test_mask_uncached_returns_request() {
        let mut cache = RangeCache::new();
        assert_eq!(cache.mask(3, 8).unwrap(), (3, 8));

        cache.put(20, 25, (20..=25).collect::<Vec<usize>>()).unwrap();
        assert_eq!(cache.mask(3, 8).unwrap(), (3, 8));
    }

    #[test]
    fn test_mask_reports_a_single_gap_only() {
        let mut cache = RangeCache::new();
        cache.put(0, 2, (0..=2).collect::<Vec<usize>>()).unwrap();
        cache.put(6, 7, (6..=7).collect::<Vec<usize>>()).unwrap();

        // Entry 6..=7 sits strictly inside the request and is not split out,
        // so 3..=10 is reported even though 6..=7 is cached.
        assert_eq!(cache.mask(0, 10).unwrap(), (3, 10));
    }

    #[test]
    fn test_inverted_ranges_are_rejected() {
        let mut cache: RangeCache<u8> = RangeCache::new();
        let err = RangeError::InvertedRange { start: 5, end: 2 };
        assert_eq!(cache.mask(5, 2), Err(err.clone()));
        assert_eq!(cache.get(5, 2), Err(err.clone()));
        assert_eq!(cache.put(5, 2, Vec::new()), Err(err));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ranges_at_the_top_of_the_index_space() {
        let mut cache = RangeCache::new();
        cache.put(usize::MAX, usize::MAX, vec!['z']).unwrap();
        cache.put(usize::MAX - 2, usize::MAX - 1, letters("xy")).unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(usize::MAX - 2, usize::MAX).unwrap(),
            Some(&letters("xyz")[..])
        );
        assert_eq!(
            cache.mask(usize::MAX - 4, usize::MAX).unwrap(),
            (usize::MAX - 4, usize::MAX - 3)
        );
        assert_eq!(cache.mask(usize::MAX - 1, usize::MAX).unwrap(), FULLY_CACHED);
        assert!(matches!(
            cache.put(0, usize::MAX, Vec::new()),
            Err(RangeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_put_rejects_wrong_item_count() {
        let mut cache = RangeCache::new();
        let result = cache.put(0, 4, vec![1, 2, 3]);
        assert_eq!(
            result,
            Err(RangeError::LengthMismatch {
                start: 0,
                end: 4,
                expected: 5,
                actual: 3,
            })
        );
        assert!(cache.is_empty());
    }
}
