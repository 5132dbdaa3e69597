//! Which frame positions take part in preview.
//!
//! Stored as a per-position mask plus a running count, so membership and
//! toggle are O(1) and ascending iteration falls out of the layout.
//!
//! Selection is positional. Reordering the sequence does NOT move the mark
//! along with the frame unless the caller explicitly asks for it via
//! `follow_move()` (see `SelectionMode::FollowFrame`).

use serde::{Deserialize, Serialize};

use super::error::{CurationError, check_index};

/// How selection reacts to `FrameSequence::reorder`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Marks stay on positions; a moved frame may silently change selection
    #[default]
    Positional,
    /// Marks travel with the moved frame
    FollowFrame,
}

/// Set of selected indices into a FrameSequence of fixed length
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    mask: Vec<bool>,
    count: usize,
}

impl SelectionSet {
    /// Selection for a sequence of `len` frames, everything selected
    pub fn all(len: usize) -> Self {
        Self {
            mask: vec![true; len],
            count: len,
        }
    }

    /// Resize to `len` positions with everything selected (sequence repopulated)
    pub fn reset(&mut self, len: usize) {
        *self = Self::all(len);
    }

    /// Flip membership of `index`
    pub fn toggle(&mut self, index: usize) -> Result<(), CurationError> {
        check_index(index, self.mask.len())?;
        let slot = &mut self.mask[index];
        *slot = !*slot;
        if *slot {
            self.count += 1;
        } else {
            self.count -= 1;
        }
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.mask.fill(true);
        self.count = self.mask.len();
    }

    pub fn clear(&mut self) {
        self.mask.fill(false);
        self.count = 0;
    }

    /// Membership test; out-of-range positions are never selected
    pub fn is_selected(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// Number of selected positions
    pub fn size(&self) -> usize {
        self.count
    }

    /// Number of positions this selection covers (sequence length)
    pub fn capacity(&self) -> usize {
        self.mask.len()
    }

    /// Selected indices in sequence order - the order playback walks.
    pub fn ordered_indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    /// Carry the mark of `from` to `to` the same way `FrameSequence::reorder`
    /// moves the frame.
    pub fn follow_move(&mut self, from: usize, to: usize) -> Result<(), CurationError> {
        let len = self.mask.len();
        check_index(from, len)?;
        check_index(to, len)?;
        let mark = self.mask.remove(from);
        self.mask.insert(to, mark);
        Ok(())
    }
}
