//! Extracts heuristic external-call evidence from recovered segments and
//! assembles the per-contract call graph.

use crate::disasm::{parse_disassembly, InstructionStream};
use crate::dispatcher::scan_dispatch_table;
use crate::segments::{recover_function, Segment};
use crate::selector::canonicalize_selector;
use indexmap::IndexMap;
use sigmap_utils::errors::DisasmError;
use std::collections::BTreeSet;

/// `PUSH4 0xffffffff` is the compiler masking a selector register, not a
/// call target, and is never recorded as evidence.
pub const SELECTOR_WILDCARD: &str = "0xffffffff";

/// Scans a function's discovery-ordered segment list for external-call
/// evidence.
///
/// A `PUSH4` constant in segment `k` counts as evidence when the next
/// segment in discovery order (`k + 1` by list position, not necessarily
/// adjacent in the bytecode) contains a `CALL`. Compilers push the target
/// selector shortly before encoding the call, and the next recovered
/// segment frequently is the call-preparation block. This is an
/// approximation, not data-flow tracking; false positives and negatives
/// are accepted.
pub fn extract_call_evidence(segments: &[Segment<'_>]) -> BTreeSet<String> {
    let mut evidence = BTreeSet::new();
    for (k, segment) in segments.iter().enumerate() {
        let Some(next) = segments.get(k + 1) else {
            break;
        };
        if !next.contains_call() {
            continue;
        }
        for instruction in segment.instructions {
            if instruction.mnemonic != "PUSH4" {
                continue;
            }
            let Some(selector) = instruction
                .operand
                .as_deref()
                .and_then(canonicalize_selector)
            else {
                continue;
            };
            if selector == SELECTOR_WILDCARD {
                continue;
            }
            tracing::debug!(selector = %selector, segment = k, "external call evidence");
            evidence.insert(selector);
        }
    }
    evidence
}

/// Builds the call graph for one contract: local selector → set of external
/// selectors, in dispatch-table order. Functions with no evidence are
/// omitted. An entry address missing from the jump table degrades to "no
/// call-graph information" for that function.
pub fn build_call_graph(
    stream: &InstructionStream,
    entries: &IndexMap<String, usize>,
) -> IndexMap<String, BTreeSet<String>> {
    let mut graph = IndexMap::new();
    for (selector, &address) in entries {
        let segments = match recover_function(stream, address) {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!(selector = %selector, error = %e, "skipping function");
                continue;
            }
        };
        let evidence = extract_call_evidence(&segments);
        if !evidence.is_empty() {
            graph.insert(selector.clone(), evidence);
        }
    }
    graph
}

/// Runs the whole analysis over one contract's disassembly text: load the
/// instruction stream, scan the dispatch table, then recover segments and
/// extract evidence per function.
pub fn analyze_contract(
    text: &str,
    disassembler_failed: bool,
) -> Result<IndexMap<String, BTreeSet<String>>, DisasmError> {
    let stream = parse_disassembly(text, disassembler_failed)?;
    let entries = scan_dispatch_table(&stream);
    Ok(build_call_graph(&stream, &entries))
}

/// Renders a call graph as the newline-delimited
/// `<selector>:<space-separated external selectors>` artifact.
pub fn render_call_graph_file(graph: &IndexMap<String, BTreeSet<String>>) -> String {
    let mut out = String::new();
    for (selector, externals) in graph {
        out.push_str(selector);
        out.push(':');
        out.push_str(&externals.iter().cloned().collect::<Vec<_>>().join(" "));
        out.push('\n');
    }
    out
}
