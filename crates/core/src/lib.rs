//! Heuristic static analysis of EVM runtime disassembly.
//!
//! Recovers, per contract, a selector→signature map from the ABI and an
//! approximate call graph from the disassembled runtime bytecode: for each
//! locally-defined function (keyed by its 4-byte selector), the set of
//! external selectors it shows dispatch evidence of calling. Pattern
//! matching over the linear instruction stream only, no symbolic execution
//! and no precise data-flow tracking.

pub mod callgraph;
pub mod disasm;
pub mod dispatcher;
pub mod segments;
pub mod selector;
