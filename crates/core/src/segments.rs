//! Recovers the code segments reachable from a function entry.
//!
//! Works directly over the flat instruction stream, no graph structure:
//! a segment runs from its start index to the first terminating
//! instruction or up to the instruction before the next `JUMPDEST`, and
//! every address-push-then-jump encountered on the way schedules the
//! target's segments for traversal.

use crate::disasm::{Instruction, InstructionStream};
use sigmap_utils::errors::AnalysisError;
use std::collections::HashSet;

/// A contiguous run of instructions treated as one traversal unit.
/// Read-only view into the owning [`InstructionStream`].
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    /// Index of the first instruction, inclusive.
    pub start: usize,
    /// Index of the last instruction, inclusive.
    pub end: usize,
    /// The instructions spanned, in program order.
    pub instructions: &'a [Instruction],
}

impl Segment<'_> {
    /// True if any instruction in the segment is a `CALL`.
    pub fn contains_call(&self) -> bool {
        self.instructions.iter().any(|i| i.mnemonic == "CALL")
    }
}

/// Upper bound on segments recovered per function. Distinct-target
/// deduplication already bounds traversal, but untrusted bytecode gets a
/// hard ceiling as well; hitting it stops the traversal cleanly.
pub const SEGMENT_CEILING: usize = 4096;

/// Recovers the ordered segment list for the function entered at
/// `entry_address`, resolving the address through the jump table first.
pub fn recover_function(
    stream: &InstructionStream,
    entry_address: usize,
) -> Result<Vec<Segment<'_>>, AnalysisError> {
    let entry_index = stream
        .resolve(entry_address)
        .ok_or(AnalysisError::UnresolvedJumpTarget(entry_address))?;
    Ok(recover_segments(stream, entry_index))
}

/// Recovers all segments reachable from `entry_index`, in discovery order:
/// each segment first, then the segments of its jump targets in the order
/// the targets were encountered during the forward scan, depth-first.
///
/// The visited set is scoped to this call, so repeated recovery of the
/// same entry yields the same list. A jump target already visited is not
/// re-traversed, which terminates traversal on cyclic bytecode.
pub fn recover_segments(stream: &InstructionStream, entry_index: usize) -> Vec<Segment<'_>> {
    if entry_index >= stream.len() {
        return Vec::new();
    }
    let mut traversal = Traversal {
        stream,
        visited: HashSet::new(),
        segments: Vec::new(),
    };
    traversal.run(entry_index);
    traversal.segments
}

/// Per-function traversal state: the worklist replaces the unbounded
/// recursion a direct rendition would use, keeping depth independent of
/// the instruction count.
struct Traversal<'a> {
    stream: &'a InstructionStream,
    /// Jump-target indices already scheduled. Prevents re-traversal of
    /// back-edges only; discovered segments are not deduplicated.
    visited: HashSet<usize>,
    segments: Vec<Segment<'a>>,
}

impl<'a> Traversal<'a> {
    fn run(&mut self, entry_index: usize) {
        let mut worklist = vec![entry_index];
        while let Some(start) = worklist.pop() {
            if self.segments.len() >= SEGMENT_CEILING {
                tracing::warn!(
                    ceiling = SEGMENT_CEILING,
                    "segment ceiling reached, stopping traversal"
                );
                break;
            }
            let (segment, targets) = self.scan_segment(start);
            self.segments.push(segment);
            // Reversed push keeps the pop order depth-first in encounter
            // order, matching the recursive formulation.
            for target in targets.into_iter().rev() {
                worklist.push(target);
            }
        }
    }

    /// Scans one segment starting at `start`, collecting the not-yet-visited
    /// jump targets encountered on the way. The segment ends at the first
    /// terminating instruction, or at the instruction before the next
    /// `JUMPDEST`, or at the end of the stream.
    fn scan_segment(&mut self, start: usize) -> (Segment<'a>, Vec<usize>) {
        let stream: &'a InstructionStream = self.stream;
        let instructions: &'a [Instruction] = &stream.instructions;
        let mut targets = Vec::new();
        let mut end = start + 1;

        while end < instructions.len() {
            let next_is_jumpdest =
                matches!(instructions.get(end + 1), Some(n) if n.mnemonic == "JUMPDEST");
            if instructions[end].is_terminator() || next_is_jumpdest {
                break;
            }
            if let Some(target) = self.jump_target(end) {
                if self.visited.insert(target) {
                    targets.push(target);
                }
            }
            end += 1;
        }
        let end = end.min(instructions.len() - 1);

        let segment = Segment {
            start,
            end,
            instructions: &instructions[start..=end],
        };
        (segment, targets)
    }

    /// Resolves the jump target of an address-push instruction, or `None`
    /// if the instruction at `index` is not one. A "jump-to-address"
    /// instruction is a `PUSH2` immediately followed by `JUMP`/`JUMPI`, or
    /// a `PUSH2` whose operand resolves to a `JUMPDEST`. A jump-table miss
    /// resolves to index 0, the "target not found" sentinel, so the lookup
    /// can never index out of bounds.
    fn jump_target(&self, index: usize) -> Option<usize> {
        let instruction = self.stream.get(index)?;
        if instruction.mnemonic != "PUSH2" {
            return None;
        }
        let operand = instruction.operand.as_deref()?;
        let address = usize::from_str_radix(operand.trim_start_matches("0x"), 16).ok()?;
        let target = match self.stream.resolve(address) {
            Some(target) => target,
            None => {
                tracing::trace!(address, "unresolved jump target, using sentinel");
                0
            }
        };

        let next_is_jump = matches!(
            self.stream.get(index + 1),
            Some(n) if n.mnemonic == "JUMP" || n.mnemonic == "JUMPI"
        );
        let lands_on_jumpdest =
            matches!(self.stream.get(target), Some(t) if t.mnemonic == "JUMPDEST");

        if next_is_jump || lands_on_jumpdest {
            Some(target)
        } else {
            None
        }
    }
}
