// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered segment collection and its editing operations.
//!
//! Every operation borrows the current collection and returns a new one in
//! canonical order (ascending start, then ascending end), so a caller always
//! holds a consistent snapshot. The collection guarantees after each edit:
//!
//! - no two segments overlap (touching endpoints are allowed),
//! - every segment is at least [`MIN_SEGMENT_MS`] long,
//! - segments stay inside `[0, duration_ms]` for the duration passed in.
//!
//! Move and resize requests whose permitted range is empty leave the
//! collection unchanged. Interactive drags hit that case constantly, so it
//! is not reported as an error; the `*_bounds` queries expose it instead.

use super::label::LabelId;
use super::segment::{is_overlap, Segment, SegmentId, SegmentRecord};
use crate::util::time::clamp_ms;
use crate::{DEFAULT_SEGMENT_MS, MIN_SEGMENT_MS};

/// Rejections from segment creation and collection validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("not enough free space at {start_ms}ms: {available_ms}ms available, {min}ms required", min = MIN_SEGMENT_MS)]
    InsufficientSpace { start_ms: i64, available_ms: i64 },

    #[error("segment [{start_ms}, {end_ms}) overlaps an existing segment")]
    Overlap { start_ms: i64, end_ms: i64 },

    #[error("segment {id} is shorter than {min}ms", min = MIN_SEGMENT_MS)]
    TooShort { id: SegmentId },

    #[error("segment {id} lies outside the media duration of {duration_ms}ms")]
    OutOfBounds { id: SegmentId, duration_ms: i64 },
}

/// Neighbor boundaries around a position in canonical order.
#[derive(Debug, Clone, Copy, Default)]
struct Neighbors {
    prev_end: Option<i64>,
    next_start: Option<i64>,
}

/// The segments of one media item, kept in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentCollection {
    segments: Vec<Segment>,
    /// Next identifier to hand out; only ever grows.
    next_id: u64,
}

impl SegmentCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from stored records, assigning fresh identifiers.
    ///
    /// Records are sorted canonically but not otherwise validated; the
    /// project decoder checks bounds before calling this.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SegmentRecord>,
    {
        let mut collection = Self::new();
        for record in records {
            let id = collection.allocate_id();
            collection.segments.push(Segment {
                id,
                start_ms: record.start_ms,
                end_ms: record.end_ms,
                label_id: record.label_id,
                text: record.text,
            });
        }
        collection.sort_in_place();
        collection
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|seg| seg.id == id)
    }

    /// Canonical position of the segment with `id`.
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|seg| seg.id == id)
    }

    /// Segments stripped of identifiers, in canonical order.
    pub fn records(&self) -> Vec<SegmentRecord> {
        self.segments.iter().map(Segment::to_record).collect()
    }

    /// True when every segment has text and a label.
    pub fn all_complete(&self) -> bool {
        self.segments.iter().all(Segment::is_complete)
    }

    /// Check the collection invariants, including media bounds when the
    /// duration is known.
    pub fn validate(&self, duration_ms: Option<i64>) -> Result<(), EditError> {
        for (idx, seg) in self.segments.iter().enumerate() {
            if seg.duration_ms() < MIN_SEGMENT_MS {
                return Err(EditError::TooShort { id: seg.id });
            }
            if let Some(duration_ms) = duration_ms {
                if seg.start_ms < 0 || seg.end_ms > duration_ms {
                    return Err(EditError::OutOfBounds {
                        id: seg.id,
                        duration_ms,
                    });
                }
            } else if seg.start_ms < 0 {
                return Err(EditError::OutOfBounds {
                    id: seg.id,
                    duration_ms: 0,
                });
            }
            if let Some(next) = self.segments.get(idx + 1) {
                if is_overlap(seg.start_ms, seg.end_ms, next.start_ms, next.end_ms) {
                    return Err(EditError::Overlap {
                        start_ms: next.start_ms,
                        end_ms: next.end_ms,
                    });
                }
            }
        }
        Ok(())
    }

    /// Return the collection in canonical order. Idempotent.
    pub fn sorted(&self) -> Self {
        let mut next = self.clone();
        next.sort_in_place();
        next
    }

    /// Replace the segments with those of `snapshot`, keeping identifier
    /// allocation ahead of both so restored history never re-issues an id.
    pub fn restore(&self, snapshot: &SegmentCollection) -> Self {
        Self {
            segments: snapshot.segments.clone(),
            next_id: self.next_id.max(snapshot.next_id),
        }
    }

    /// Create a default-length segment starting at `point_ms`.
    ///
    /// The start snaps forward to the end of the segment at or before the
    /// point and the end snaps back to the start of the following segment.
    /// Returns the new collection and the identifier of the created segment.
    pub fn create_at(
        &self,
        point_ms: i64,
        duration_ms: i64,
    ) -> Result<(Self, SegmentId), EditError> {
        let mut start = clamp_ms(point_ms, 0, duration_ms);
        let mut end = start.saturating_add(DEFAULT_SEGMENT_MS).min(duration_ms);

        let neighbors = self.neighbors_for_insert(start);
        if let Some(prev_end) = neighbors.prev_end {
            if start < prev_end {
                start = prev_end;
            }
        }
        if let Some(next_start) = neighbors.next_start {
            if end > next_start {
                end = next_start;
            }
        }

        let available_ms = end.saturating_sub(start);
        if available_ms < MIN_SEGMENT_MS {
            return Err(EditError::InsufficientSpace {
                start_ms: start,
                available_ms: available_ms.max(0),
            });
        }

        if self
            .segments
            .iter()
            .any(|seg| is_overlap(start, end, seg.start_ms, seg.end_ms))
        {
            return Err(EditError::Overlap {
                start_ms: start,
                end_ms: end,
            });
        }

        let mut next = self.clone();
        let id = next.allocate_id();
        next.segments.push(Segment {
            id,
            start_ms: start,
            end_ms: end,
            label_id: None,
            text: String::new(),
        });
        next.sort_in_place();
        Ok((next, id))
    }

    /// Permitted start range for moving segment `id` without changing its
    /// length, or `None` when the neighbors leave no room.
    pub fn move_bounds(&self, id: SegmentId, duration_ms: i64) -> Option<(i64, i64)> {
        let idx = self.index_of(id)?;
        let seg = &self.segments[idx];
        let length = seg.duration_ms();
        let neighbors = self.neighbors_at(idx);
        let min_start = neighbors.prev_end.unwrap_or(0).max(0);
        let max_start = neighbors
            .next_start
            .unwrap_or(duration_ms)
            .min(duration_ms)
            .saturating_sub(length);
        (min_start <= max_start).then_some((min_start, max_start))
    }

    /// Permitted range for the start boundary of segment `id`.
    pub fn resize_start_bounds(&self, id: SegmentId) -> Option<(i64, i64)> {
        let idx = self.index_of(id)?;
        let seg = &self.segments[idx];
        let min_start = self.neighbors_at(idx).prev_end.unwrap_or(0).max(0);
        let max_start = seg.end_ms.saturating_sub(MIN_SEGMENT_MS);
        (min_start <= max_start).then_some((min_start, max_start))
    }

    /// Permitted range for the end boundary of segment `id`.
    pub fn resize_end_bounds(&self, id: SegmentId, duration_ms: i64) -> Option<(i64, i64)> {
        let idx = self.index_of(id)?;
        let seg = &self.segments[idx];
        let min_end = seg.start_ms.saturating_add(MIN_SEGMENT_MS);
        let max_end = self
            .neighbors_at(idx)
            .next_start
            .unwrap_or(duration_ms)
            .min(duration_ms);
        (min_end <= max_end).then_some((min_end, max_end))
    }

    /// Translate segment `id` toward `proposed_start_ms`, clamped between its
    /// neighbors and the media bounds.
    pub fn move_segment(&self, id: SegmentId, proposed_start_ms: i64, duration_ms: i64) -> Self {
        let Some((min_start, max_start)) = self.move_bounds(id, duration_ms) else {
            return self.clone();
        };
        let start = clamp_ms(proposed_start_ms, min_start, max_start);
        self.update(id, |seg| {
            let length = seg.duration_ms();
            seg.start_ms = start;
            seg.end_ms = start.saturating_add(length);
        })
    }

    /// Move the start boundary of segment `id`, keeping its end fixed.
    pub fn resize_start(&self, id: SegmentId, proposed_start_ms: i64) -> Self {
        let Some((min_start, max_start)) = self.resize_start_bounds(id) else {
            return self.clone();
        };
        let start = clamp_ms(proposed_start_ms, min_start, max_start);
        self.update(id, |seg| seg.start_ms = start)
    }

    /// Move the end boundary of segment `id`, keeping its start fixed.
    pub fn resize_end(&self, id: SegmentId, proposed_end_ms: i64, duration_ms: i64) -> Self {
        let Some((min_end, max_end)) = self.resize_end_bounds(id, duration_ms) else {
            return self.clone();
        };
        let end = clamp_ms(proposed_end_ms, min_end, max_end);
        self.update(id, |seg| seg.end_ms = end)
    }

    pub fn set_text(&self, id: SegmentId, text: impl Into<String>) -> Self {
        let text = text.into();
        self.update(id, |seg| seg.text = text)
    }

    /// Assign or clear the label of segment `id`.
    pub fn set_label(&self, id: SegmentId, label_id: Option<LabelId>) -> Self {
        self.update(id, |seg| seg.label_id = label_id)
    }

    pub fn remove(&self, id: SegmentId) -> Self {
        let mut next = self.clone();
        next.segments.retain(|seg| seg.id != id);
        next
    }

    fn update<F>(&self, id: SegmentId, apply: F) -> Self
    where
        F: FnOnce(&mut Segment),
    {
        let mut next = self.clone();
        if let Some(seg) = next.segments.iter_mut().find(|seg| seg.id == id) {
            apply(seg);
            next.sort_in_place();
        }
        next
    }

    fn allocate_id(&mut self) -> SegmentId {
        self.next_id += 1;
        SegmentId(self.next_id)
    }

    fn sort_in_place(&mut self) {
        self.segments.sort_by_key(|seg| (seg.start_ms, seg.end_ms));
    }

    fn neighbors_at(&self, idx: usize) -> Neighbors {
        Neighbors {
            prev_end: idx
                .checked_sub(1)
                .and_then(|prev| self.segments.get(prev))
                .map(|seg| seg.end_ms),
            next_start: self.segments.get(idx + 1).map(|seg| seg.start_ms),
        }
    }

    /// Neighbors of a new segment starting at `start_ms`: the last segment
    /// starting at or before it and the first one starting after it.
    fn neighbors_for_insert(&self, start_ms: i64) -> Neighbors {
        let split = self.segments.partition_point(|seg| seg.start_ms <= start_ms);
        Neighbors {
            prev_end: split
                .checked_sub(1)
                .map(|prev| self.segments[prev].end_ms),
            next_start: self.segments.get(split).map(|seg| seg.start_ms),
        }
    }
}

impl<'a> IntoIterator for &'a SegmentCollection {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn record(start_ms: i64, end_ms: i64) -> SegmentRecord {
        SegmentRecord {
            start_ms,
            end_ms,
            text: String::new(),
            label_id: None,
        }
    }

    fn collection(bounds: &[(i64, i64)]) -> SegmentCollection {
        SegmentCollection::from_records(bounds.iter().map(|&(s, e)| record(s, e)))
    }

    fn bounds(collection: &SegmentCollection) -> Vec<(i64, i64)> {
        collection.iter().map(|seg| (seg.start_ms, seg.end_ms)).collect()
    }

    fn id_at(collection: &SegmentCollection, idx: usize) -> SegmentId {
        collection.segments()[idx].id
    }

    #[test]
    fn test_from_records_sorts_canonically() {
        let c = collection(&[(2000, 3000), (0, 500), (0, 100)]);
        assert_eq!(bounds(&c), vec![(0, 100), (0, 500), (2000, 3000)]);
        assert_eq!(c.sorted(), c);
    }

    #[test]
    fn test_create_in_empty_collection() {
        let (c, id) = SegmentCollection::new().create_at(500, 10_000).unwrap();
        assert_eq!(bounds(&c), vec![(500, 2500)]);
        assert_eq!(c.get(id).map(|seg| seg.text.as_str()), Some(""));
        assert_eq!(c.get(id).and_then(|seg| seg.label_id), None);
    }

    #[test]
    fn test_create_clamps_to_media_end() {
        let (c, _) = SegmentCollection::new().create_at(9_000, 10_000).unwrap();
        assert_eq!(bounds(&c), vec![(9_000, 10_000)]);

        let err = SegmentCollection::new().create_at(12_000, 10_000).unwrap_err();
        assert!(matches!(err, EditError::InsufficientSpace { .. }));
    }

    #[test]
    fn test_create_snaps_both_sides() {
        let c = collection(&[(0, 1000), (2000, 3000)]);
        let (c, id) = c.create_at(900, 5000).unwrap();
        let created = c.get(id).unwrap();
        assert_eq!((created.start_ms, created.end_ms), (1000, 2000));
        assert_eq!(bounds(&c), vec![(0, 1000), (1000, 2000), (2000, 3000)]);
    }

    #[test]
    fn test_create_rejects_narrow_gap() {
        let c = collection(&[(0, 1000), (1030, 2000)]);
        let err = c.create_at(900, 5000).unwrap_err();
        assert_eq!(
            err,
            EditError::InsufficientSpace {
                start_ms: 1000,
                available_ms: 30
            }
        );
    }

    #[test]
    fn test_create_snaps_end_to_next_start() {
        let c = collection(&[(3000, 4000)]);
        let (c, _) = c.create_at(2000, 5000).unwrap();
        assert_eq!(bounds(&c), vec![(2000, 3000), (3000, 4000)]);
    }

    #[test]
    fn test_created_ids_are_never_reused() {
        let (c, first) = SegmentCollection::new().create_at(0, 10_000).unwrap();
        let c = c.remove(first);
        let (_, second) = c.create_at(0, 10_000).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_resize_start_snaps_to_previous_end() {
        let c = collection(&[(0, 1000), (1500, 2000)]);
        let c = c.resize_start(id_at(&c, 1), 900);
        assert_eq!(bounds(&c), vec![(0, 1000), (1000, 2000)]);
    }

    #[test]
    fn test_resize_start_minimum_length() {
        let c = collection(&[(1000, 2000)]);
        let c = c.resize_start(id_at(&c, 0), 1990);
        assert_eq!(bounds(&c), vec![(1950, 2000)]);
    }

    #[test]
    fn test_resize_end_snaps_to_next_start() {
        let c = collection(&[(0, 1000), (1500, 2000)]);
        let c = c.resize_end(id_at(&c, 0), 1600, 5000);
        assert_eq!(bounds(&c), vec![(0, 1500), (1500, 2000)]);
    }

    #[test]
    fn test_resize_end_minimum_length() {
        let c = collection(&[(0, 1000)]);
        let c = c.resize_end(id_at(&c, 0), 10, 5000);
        assert_eq!(bounds(&c), vec![(0, MIN_SEGMENT_MS)]);
    }

    #[test]
    fn test_resize_end_clamps_to_duration() {
        let c = collection(&[(0, 1000)]);
        let c = c.resize_end(id_at(&c, 0), 9000, 5000);
        assert_eq!(bounds(&c), vec![(0, 5000)]);
    }

    #[test]
    fn test_move_clamps_within_neighbors() {
        let c = collection(&[(0, 1000), (1500, 2000)]);
        let c = c.move_segment(id_at(&c, 1), 900, 5000);
        assert_eq!(bounds(&c), vec![(0, 1000), (1000, 1500)]);
    }

    #[test]
    fn test_move_clamps_to_media_end() {
        let c = collection(&[(0, 1000)]);
        let c = c.move_segment(id_at(&c, 0), 4800, 5000);
        assert_eq!(bounds(&c), vec![(4000, 5000)]);
    }

    #[test]
    fn test_move_without_room_is_noop() {
        // Segment longer than the media it is moved within
        let c = collection(&[(0, 1000), (1000, 4000), (4000, 5000)]);
        let id = id_at(&c, 1);
        assert_eq!(c.move_bounds(id, 3000), None);
        assert_eq!(c.move_segment(id, 500, 3000), c);
        assert_eq!(c.move_bounds(id, 5000), Some((1000, 1000)));
    }

    #[test]
    fn test_resize_bounds_report_infeasible_ranges() {
        let c = collection(&[(0, 1000), (1000, 1040)]);
        let short = id_at(&c, 1);
        assert_eq!(c.resize_start_bounds(short), None);
        assert_eq!(c.resize_start(short, 500), c);
        assert_eq!(c.resize_end_bounds(short, 1045), None);
        assert_eq!(c.resize_end(short, 2000, 1045), c);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let c = collection(&[(0, 1000)]);
        let missing = SegmentId(999);
        assert_eq!(c.move_segment(missing, 10, 5000), c);
        assert_eq!(c.resize_start(missing, 10), c);
        assert_eq!(c.resize_end(missing, 10, 5000), c);
        assert_eq!(c.set_text(missing, "x"), c);
        assert_eq!(c.set_label(missing, Some(1)), c);
        assert_eq!(c.remove(missing), c);
    }

    #[test]
    fn test_text_label_and_remove() {
        let c = collection(&[(0, 1000), (2000, 3000)]);
        let id = id_at(&c, 1);
        let c = c.set_text(id, "hello").set_label(id, Some(4));
        let seg = c.get(id).unwrap();
        assert_eq!(seg.text, "hello");
        assert_eq!(seg.label_id, Some(4));
        assert!(seg.is_complete());
        assert!(!c.all_complete());

        let c = c.remove(id_at(&c, 0));
        assert!(c.all_complete());
        assert_eq!(c.len(), 1);
        assert_eq!(c.set_label(id, None).get(id).unwrap().label_id, None);
    }

    #[test]
    fn test_restore_keeps_id_allocation_ahead() {
        let empty = SegmentCollection::new();
        let (c, first) = empty.create_at(0, 10_000).unwrap();
        let restored = c.restore(&empty);
        assert!(restored.is_empty());
        let (_, second) = restored.create_at(0, 10_000).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_reports_violations() {
        assert_eq!(collection(&[(0, 1000), (1000, 2000)]).validate(Some(2000)), Ok(()));

        let overlapping = collection(&[(0, 1000), (900, 2000)]);
        assert!(matches!(overlapping.validate(None), Err(EditError::Overlap { .. })));

        let short = collection(&[(0, 10)]);
        assert!(matches!(short.validate(None), Err(EditError::TooShort { .. })));

        let long = collection(&[(0, 3000)]);
        assert!(matches!(long.validate(Some(2000)), Err(EditError::OutOfBounds { .. })));
    }

    #[test]
    fn test_random_edits_preserve_invariants() {
        const DURATION: i64 = 60_000;
        let mut rng = StdRng::seed_from_u64(0x5e6_a11);

        for _ in 0..50 {
            let mut c = SegmentCollection::new();
            for _ in 0..200 {
                let target = if c.is_empty() {
                    None
                } else {
                    Some(id_at(&c, rng.gen_range(0..c.len())))
                };
                let point = rng.gen_range(-2_000..DURATION + 2_000);
                c = match (rng.gen_range(0..5), target) {
                    (0, _) | (_, None) => match c.create_at(point, DURATION) {
                        Ok((next, _)) => next,
                        Err(_) => c,
                    },
                    (1, Some(id)) => c.move_segment(id, point, DURATION),
                    (2, Some(id)) => c.resize_start(id, point),
                    (3, Some(id)) => c.resize_end(id, point, DURATION),
                    (_, Some(id)) if rng.gen_bool(0.2) => c.remove(id),
                    (_, Some(_)) => c,
                };
                assert_eq!(c.validate(Some(DURATION)), Ok(()));
                assert_eq!(c.sorted(), c);
            }
        }
    }

    #[test]
    fn test_create_rejects_overlap_with_inconsistent_input() {
        // A nested segment, as a hand-edited project file could contain
        let c = collection(&[(0, 5000), (100, 200)]);
        assert_eq!(
            c.create_at(150, 10_000),
            Err(EditError::Overlap {
                start_ms: 200,
                end_ms: 2150
            })
        );
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let err = SegmentCollection::new()
            .create_at(i64::MAX, i64::MAX)
            .unwrap_err();
        assert!(matches!(err, EditError::InsufficientSpace { .. }));

        let c = collection(&[(i64::MIN, i64::MAX)]);
        let id = id_at(&c, 0);
        assert_eq!(c.segments()[0].duration_ms(), i64::MAX);
        assert_eq!(c.move_bounds(id, 5000), None);
        assert_eq!(c.move_segment(id, 0, 5000), c);
        assert_eq!(c.resize_start_bounds(id), Some((0, i64::MAX - 50)));
        assert_eq!(
            c.resize_end_bounds(id, i64::MAX),
            Some((i64::MIN + 50, i64::MAX))
        );
        assert_eq!(bounds(&c.resize_start(id, 0)), vec![(0, i64::MAX)]);
        assert_eq!(bounds(&c.resize_end(id, 0, i64::MAX)), vec![(i64::MIN, 0)]);
    }
}
