use crate::fixtures::{CONTRACT_ASM, LOOP_ASM};
use sigmap_core::disasm::parse_disassembly;
use sigmap_core::segments::{recover_function, recover_segments, SEGMENT_CEILING};
use sigmap_utils::errors::AnalysisError;

#[test]
fn test_discovery_order_follows_jumps() {
    let stream = parse_disassembly(CONTRACT_ASM, false).unwrap();
    let segments = recover_function(&stream, 0x10).unwrap();

    assert_eq!(segments.len(), 2);
    // Entry segment first, then the jump target's segment.
    assert_eq!((segments[0].start, segments[0].end), (6, 9));
    assert_eq!((segments[1].start, segments[1].end), (10, 13));
    assert!(!segments[0].contains_call());
    assert!(segments[1].contains_call());
}

#[test]
fn test_straight_line_function_is_one_segment() {
    let text = "\
00000: JUMPDEST
00001: PUSH1 0x01
00003: PUSH1 0x02
00005: ADD
00006: RETURN
";
    let stream = parse_disassembly(text, false).unwrap();
    let segments = recover_function(&stream, 0x0).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!((segments[0].start, segments[0].end), (0, 4));
}

#[test]
fn test_cyclic_jump_terminates() {
    let stream = parse_disassembly(LOOP_ASM, false).unwrap();
    let segments = recover_segments(&stream, 0);

    // The back-edge target is traversed once, not forever.
    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].start, segments[0].end), (0, 2));
    assert_eq!((segments[1].start, segments[1].end), (0, 2));
}

#[test]
fn test_recovery_is_idempotent() {
    let stream = parse_disassembly(CONTRACT_ASM, false).unwrap();
    let first = recover_function(&stream, 0x10).unwrap();
    let second = recover_function(&stream, 0x10).unwrap();

    let spans = |segments: &[sigmap_core::segments::Segment<'_>]| {
        segments.iter().map(|s| (s.start, s.end)).collect::<Vec<_>>()
    };
    assert_eq!(spans(&first), spans(&second));
}

#[test]
fn test_unresolved_entry_address() {
    let stream = parse_disassembly(CONTRACT_ASM, false).unwrap();
    let result = recover_function(&stream, 0x999);
    assert!(matches!(
        result,
        Err(AnalysisError::UnresolvedJumpTarget(0x999))
    ));
}

#[test]
fn test_unresolved_jump_target_uses_sentinel() {
    // PUSH2 to an address with no instruction: the target resolves to the
    // index-0 sentinel and traversal continues from there.
    let text = "\
00000: JUMPDEST
00001: PUSH2 0x0999
00004: JUMP
00005: JUMPDEST
00006: STOP
";
    let stream = parse_disassembly(text, false).unwrap();
    let segments = recover_segments(&stream, 0);
    assert_eq!(segments.len(), 2);
    assert_eq!((segments[0].start, segments[0].end), (0, 2));
    assert_eq!(segments[1].start, 0);
}

#[test]
fn test_segment_ceiling_bounds_traversal() {
    // A jump chain longer than the ceiling: block i ends with a PUSH2/JUMP
    // into block i+1, so every block is a distinct jump target and the
    // visited set never cuts the traversal short on its own.
    let blocks = SEGMENT_CEILING + 64;
    let mut text = String::new();
    for i in 0..blocks {
        let addr = i * 8;
        let next = (i + 1) * 8;
        text.push_str(&format!("{addr:05x}: JUMPDEST\n"));
        text.push_str(&format!("{:05x}: PUSH2 0x{next:04x}\n", addr + 1));
        text.push_str(&format!("{:05x}: JUMP\n", addr + 4));
    }

    let stream = parse_disassembly(&text, false).unwrap();
    let segments = recover_segments(&stream, 0);
    assert_eq!(segments.len(), SEGMENT_CEILING);
}

#[test]
fn test_segment_ends_before_next_jumpdest() {
    let text = "\
00000: JUMPDEST
00001: PUSH1 0x00
00003: POP
00004: JUMPDEST
00005: STOP
";
    let stream = parse_disassembly(text, false).unwrap();
    let segments = recover_segments(&stream, 0);
    assert_eq!(segments.len(), 1);
    // Ends at POP because the next instruction opens a new block.
    assert_eq!((segments[0].start, segments[0].end), (0, 2));
}
