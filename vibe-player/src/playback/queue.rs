//! Play queue
//!
//! Ordered track references plus the current position. All operations are
//! pure and synchronous; the coordinator applies them under its write lock.
//!
//! `current` is `None` or a valid index. Tracks added through
//! [`PlayQueue::enqueue`] and [`PlayQueue::enqueue_next`] appear at most
//! once; a sequence handed to [`PlayQueue::replace`] is taken as-is.

use rand::seq::SliceRandom;
use rand::Rng;
use vibe_common::{Track, TrackId};

#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    tracks: Vec<Track>,
    current: Option<usize>,
    /// Pre-shuffle order, restored by [`PlayQueue::unshuffle`]
    unshuffled: Option<Vec<Track>>,
}

/// Result of [`PlayQueue::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOutcome {
    /// Occurrences removed
    pub removed: usize,
    /// Occurrences that sat before the current index
    pub removed_before: usize,
    /// The current entry itself was removed
    pub removed_current: bool,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn is_shuffled(&self) -> bool {
        self.unshuffled.is_some()
    }

    /// Point at `index`; out-of-range clears the position
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&i| i < self.tracks.len());
    }

    /// Replace the whole queue, dropping any stashed pre-shuffle order
    pub fn replace(&mut self, tracks: Vec<Track>, current: Option<usize>) {
        self.tracks = tracks;
        self.unshuffled = None;
        self.set_current(current);
    }

    /// Append `track`, moving it to the end if already queued
    ///
    /// Every earlier occurrence goes; when one of them was the current entry
    /// the position follows the track to the end.
    pub fn enqueue(&mut self, track: Track) {
        let outcome = self.extract(track.id, None);
        if outcome.removed == 0 {
            self.stash_push(&track);
        }
        self.tracks.push(track);
        if outcome.removed_current {
            self.current = Some(self.tracks.len() - 1);
        }
    }

    /// Place `track` right after the current entry (front when there is none)
    ///
    /// Already queued tracks are moved; the current entry keeps its identity.
    pub fn enqueue_next(&mut self, track: Track) {
        let playing = self
            .current
            .filter(|&c| self.tracks.get(c).is_some_and(|t| t.id == track.id));
        let outcome = self.extract(track.id, playing);
        if playing.is_some() {
            return;
        }

        if outcome.removed == 0 {
            self.stash_push(&track);
        }
        let at = self.current.map_or(0, |c| c + 1);
        self.tracks.insert(at, track);
    }

    /// Remove every occurrence of `id`
    ///
    /// When the current entry is removed the position is cleared; the caller
    /// decides what plays next using `removed_before`.
    pub fn remove(&mut self, id: TrackId) -> RemoveOutcome {
        let outcome = self.extract(id, None);
        if outcome.removed > 0 {
            if let Some(stash) = self.unshuffled.as_mut() {
                stash.retain(|t| t.id != id);
            }
        }
        outcome
    }

    /// Replace the order wholesale, keeping the current entry by identity
    ///
    /// Falls back to the previous index when the current track is no longer
    /// present (or to none when that index is out of range).
    pub fn reorder(&mut self, tracks: Vec<Track>) {
        let current_id = self.current().map(|t| t.id);
        let previous = self.current;
        self.tracks = tracks;

        self.current = match current_id.and_then(|id| self.position_of(id)) {
            Some(i) => Some(i),
            None => previous.filter(|&i| i < self.tracks.len()),
        };
    }

    /// Drop everything except the current entry
    pub fn collapse_to_current(&mut self) {
        match self.current().cloned() {
            Some(track) => {
                self.tracks = vec![track];
                self.current = Some(0);
            }
            None => self.tracks.clear(),
        }
        self.unshuffled = None;
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current = None;
        self.unshuffled = None;
    }

    /// Shuffle everything but the current entry, which keeps its index
    ///
    /// The previous order is stashed for [`PlayQueue::unshuffle`].
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.unshuffled.is_none() {
            self.unshuffled = Some(self.tracks.clone());
        }

        match self.current {
            Some(c) => {
                let current = self.tracks.remove(c);
                self.tracks.shuffle(rng);
                self.tracks.insert(c, current);
            }
            None => self.tracks.shuffle(rng),
        }
    }

    /// Restore the stashed order
    ///
    /// Tracks removed since shuffling stay removed; tracks added since are
    /// appended in their current relative order.
    pub fn unshuffle(&mut self) {
        let Some(original) = self.unshuffled.take() else {
            return;
        };
        let current_id = self.current().map(|t| t.id);

        let mut restored: Vec<Track> = original
            .into_iter()
            .filter(|t| self.contains(t.id))
            .collect();
        for track in &self.tracks {
            if !restored.iter().any(|t| t.id == track.id) {
                restored.push(track.clone());
            }
        }

        self.tracks = restored;
        self.current = current_id.and_then(|id| self.position_of(id));
    }

    /// Drop every occurrence of `id` except the one at `keep`
    ///
    /// The stashed order keeps a single copy so unshuffling cannot bring the
    /// duplicates back.
    fn extract(&mut self, id: TrackId, keep: Option<usize>) -> RemoveOutcome {
        let mut outcome = RemoveOutcome::default();
        let mut kept = Vec::with_capacity(self.tracks.len());

        for (index, track) in self.tracks.drain(..).enumerate() {
            if track.id != id || keep == Some(index) {
                kept.push(track);
                continue;
            }
            outcome.removed += 1;
            match self.current {
                Some(c) if index < c => outcome.removed_before += 1,
                Some(c) if index == c => outcome.removed_current = true,
                _ => {}
            }
        }
        self.tracks = kept;

        if outcome.removed > 0 {
            if let Some(stash) = self.unshuffled.as_mut() {
                let mut seen = false;
                stash.retain(|t| t.id != id || !std::mem::replace(&mut seen, true));
            }
            self.current = if outcome.removed_current {
                None
            } else {
                self.current.map(|c| c - outcome.removed_before)
            };
        }
        outcome
    }

    fn stash_push(&mut self, track: &Track) {
        if let Some(stash) = self.unshuffled.as_mut() {
            stash.push(track.clone());
        }
    }
}
