use crate::fixtures::{CONTRACT_ASM, WILDCARD_ASM};
use sigmap_core::callgraph::{
    analyze_contract, build_call_graph, extract_call_evidence, render_call_graph_file,
};
use sigmap_core::disasm::parse_disassembly;
use sigmap_core::dispatcher::scan_dispatch_table;
use sigmap_core::segments::recover_function;

#[test]
fn test_end_to_end_call_edge() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    let graph = analyze_contract(CONTRACT_ASM, false).unwrap();
    tracing::debug!(?graph, "recovered call graph");
    assert_eq!(graph.len(), 1);
    let externals = graph.get("0x2fbebd38").unwrap();
    assert_eq!(externals.len(), 1);
    assert!(externals.contains("0x12345678"));
}

#[test]
fn test_wildcard_push4_is_excluded() {
    let graph = analyze_contract(WILDCARD_ASM, false).unwrap();
    // The only PUSH4 in the body is 0xffffffff, so no evidence at all and
    // the function is omitted rather than emitted empty.
    assert!(graph.is_empty());
}

#[test]
fn test_evidence_requires_call_in_next_segment() {
    // Same shape as CONTRACT_ASM but the jump target block has no CALL.
    let text = "\
00000: PUSH4 0x2fbebd38
00005: EQ
00006: PUSH2 0x0010
00009: JUMPI
0000a: STOP
00010: JUMPDEST
00011: PUSH4 0x12345678
00016: PUSH2 0x0020
00019: JUMP
00020: JUMPDEST
00021: POP
00022: STOP
";
    let graph = analyze_contract(text, false).unwrap();
    assert!(graph.is_empty());
}

#[test]
fn test_push4_in_last_segment_is_not_evidence() {
    // No following segment in discovery order means no adjacency evidence.
    let text = "\
00000: PUSH4 0x2fbebd38
00005: EQ
00006: PUSH2 0x0010
00009: JUMPI
0000a: STOP
00010: JUMPDEST
00011: PUSH4 0x12345678
00016: CALL
00017: STOP
";
    let stream = parse_disassembly(text, false).unwrap();
    let segments = recover_function(&stream, 0x10).unwrap();
    assert_eq!(segments.len(), 1);
    assert!(extract_call_evidence(&segments).is_empty());
}

#[test]
fn test_evidence_is_deduplicated() {
    let text = "\
00000: PUSH4 0x2fbebd38
00005: EQ
00006: PUSH2 0x0010
00009: JUMPI
0000a: STOP
00010: JUMPDEST
00011: PUSH4 0x12345678
00016: PUSH4 0x12345678
0001b: PUSH2 0x0020
0001e: JUMP
00020: JUMPDEST
00021: CALL
00022: STOP
";
    let stream = parse_disassembly(text, false).unwrap();
    let entries = scan_dispatch_table(&stream);
    let graph = build_call_graph(&stream, &entries);
    assert_eq!(graph.get("0x2fbebd38").unwrap().len(), 1);
}

#[test]
fn test_render_call_graph_lines() {
    let graph = analyze_contract(CONTRACT_ASM, false).unwrap();
    assert_eq!(render_call_graph_file(&graph), "0x2fbebd38:0x12345678\n");
}

#[test]
fn test_unresolved_entry_degrades_gracefully() {
    // Dispatcher points at an address with no instruction: the function is
    // recorded with no call-graph information instead of aborting.
    let text = "\
00000: PUSH4 0x2fbebd38
00005: EQ
00006: PUSH2 0x0999
00009: JUMPI
0000a: STOP
";
    let graph = analyze_contract(text, false).unwrap();
    assert!(graph.is_empty());
}
