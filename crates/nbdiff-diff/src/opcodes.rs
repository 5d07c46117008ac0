//! Line-level diff: partition two sequences into maximal opcode runs.
//!
//! Alignment comes from the `similar` crate (Myers, which yields a longest
//! common subsequence). The raw operations are then normalized so that runs
//! are maximal: consecutive equal runs are fused, and any adjacent
//! delete/insert pair becomes a single replace.

use std::hash::Hash;
use std::ops::Range;
use std::time::{Duration, Instant};

use similar::{capture_diff_slices_deadline, Algorithm, DiffTag};

/// Time allowed for one line alignment before settling for a coarser script.
pub const LINE_DIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// The kind of one opcode run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpTag {
    /// `left[range] == right[range]`.
    Equal,
    /// `left[range]` should be replaced by `right[range]`.
    Replace,
    /// `left[range]` is absent on the right. The right range is empty.
    Delete,
    /// `right[range]` is absent on the left. The left range is empty.
    Insert,
}

impl From<DiffTag> for OpTag {
    fn from(tag: DiffTag) -> Self {
        match tag {
            DiffTag::Equal => OpTag::Equal,
            DiffTag::Delete => OpTag::Delete,
            DiffTag::Insert => OpTag::Insert,
            DiffTag::Replace => OpTag::Replace,
        }
    }
}

/// One run of an edit script. Ranges are 0-based, half-open indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub left: Range<usize>,
    pub right: Range<usize>,
}

impl Opcode {
    pub fn new(tag: OpTag, left: Range<usize>, right: Range<usize>) -> Self {
        Self { tag, left, right }
    }
}

/// Ordered opcodes covering both input sequences end to end.
///
/// Invariants:
/// - opcodes are contiguous on both sides, starting at 0;
/// - no opcode is empty on both sides;
/// - no two adjacent opcodes could be fused into one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<Opcode>,
}

impl EditScript {
    pub fn ops(&self) -> &[Opcode] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Opcode> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns `true` if both sequences were identical.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.tag == OpTag::Equal)
    }

    /// Number of opcodes that are not `Equal`.
    pub fn change_count(&self) -> usize {
        self.ops.iter().filter(|op| op.tag != OpTag::Equal).count()
    }

    /// Rebuild the left sequence from its equal, replace, and delete runs.
    pub fn reconstruct_left<T: Clone>(&self, left: &[T]) -> Vec<T> {
        self.ops
            .iter()
            .filter(|op| op.tag != OpTag::Insert)
            .flat_map(|op| left[op.left.clone()].iter().cloned())
            .collect()
    }

    /// Rebuild the right sequence from its equal, replace, and insert runs.
    pub fn reconstruct_right<T: Clone>(&self, right: &[T]) -> Vec<T> {
        self.ops
            .iter()
            .filter(|op| op.tag != OpTag::Delete)
            .flat_map(|op| right[op.right.clone()].iter().cloned())
            .collect()
    }

    /// Append an opcode, fusing it into the previous one where possible.
    fn push(&mut self, op: Opcode) {
        if op.left.is_empty() && op.right.is_empty() {
            return;
        }
        if let Some(last) = self.ops.last_mut() {
            let fused = match (last.tag, op.tag) {
                (OpTag::Equal, OpTag::Equal) => Some(OpTag::Equal),
                (OpTag::Equal, _) | (_, OpTag::Equal) => None,
                (OpTag::Delete, OpTag::Delete) => Some(OpTag::Delete),
                (OpTag::Insert, OpTag::Insert) => Some(OpTag::Insert),
                _ => Some(OpTag::Replace),
            };
            if let Some(tag) = fused {
                last.tag = tag;
                last.left.end = op.left.end;
                last.right.end = op.right.end;
                return;
            }
        }
        self.ops.push(op);
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Opcode;
    type IntoIter = std::slice::Iter<'a, Opcode>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Compute the edit script turning `left` into `right`.
///
/// Alignment is bounded by [`LINE_DIFF_TIMEOUT`]. Past the deadline the
/// script may be coarser than minimal, but it still covers both inputs.
pub fn diff_lines<T: Hash + Eq + Ord>(left: &[T], right: &[T]) -> EditScript {
    let deadline = Some(Instant::now() + LINE_DIFF_TIMEOUT);
    let mut script = EditScript::default();
    for op in capture_diff_slices_deadline(Algorithm::Myers, left, right, deadline) {
        let (tag, old, new) = op.as_tag_tuple();
        script.push(Opcode::new(tag.into(), old, new));
    }
    script
}
