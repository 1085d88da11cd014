//! sigmap's single entry-point for turning `evm disasm` text into an
//! indexed instruction stream.

use sigmap_utils::errors::DisasmError;
use std::collections::HashMap;
use std::fmt;

/// Represents a single disassembled instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Zero-based position in the instruction sequence.
    pub index: usize,
    /// Byte offset parsed from the disassembly label. May be sparse.
    pub address: usize,
    /// Opcode name (e.g. "PUSH4", "JUMPDEST", "CALL").
    pub mnemonic: String,
    /// Any immediate data attached to push-family mnemonics, verbatim
    /// (usually `0x`-prefixed hex), if present.
    pub operand: Option<String>,
}

impl Instruction {
    /// True for instructions that end a function body: `RETURN`, `STOP`,
    /// and the markers go-ethereum's disassembler emits for reverting or
    /// undefined opcodes. Newer builds print `opcode 0xfe not defined`,
    /// older ones `Missing opcode 0xfe`; both shapes are recognized.
    pub fn is_terminator(&self) -> bool {
        match self.mnemonic.as_str() {
            "RETURN" | "STOP" | "REVERT" | "INVALID" => true,
            "Missing" => matches!(&self.operand, Some(op) if op.starts_with("opcode")),
            "opcode" => matches!(&self.operand, Some(op) if op.ends_with("not defined")),
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // address: five-digit hex label, then mnemonic and optional operand
        if let Some(operand) = &self.operand {
            write!(f, "{:05x}: {} {}", self.address, self.mnemonic, operand)
        } else {
            write!(f, "{:05x}: {}", self.address, self.mnemonic)
        }
    }
}

/// The disassembled runtime code region of one contract, indexed two ways:
/// positionally and by byte address. Built once per contract and never
/// mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct InstructionStream {
    /// Instructions in line order.
    pub instructions: Vec<Instruction>,
    /// Byte address → sequence index. Every value is a valid index into
    /// `instructions`; a missing key means "no such block", not a fault.
    pub jump_table: HashMap<usize, usize>,
}

impl InstructionStream {
    /// Number of instructions in the stream.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True if the stream holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Resolves a byte address to its sequence index. A miss is a
    /// well-defined "no such jump destination".
    pub fn resolve(&self, address: usize) -> Option<usize> {
        self.jump_table.get(&address).copied()
    }
}

/// Parses disassembler output into an [`InstructionStream`].
///
/// Expects one instruction per line, `<hex-address>: <MNEMONIC> [operand]`.
/// When `disassembler_failed` is set the final line is the disassembler's
/// diagnostic and is dropped before parsing. A leading banner line that
/// does not start with a hex address label is skipped. Any other line that
/// fails to split on `:` or whose address is not hex fails the whole load
/// with [`DisasmError::MalformedDisassembly`].
pub fn parse_disassembly(
    text: &str,
    disassembler_failed: bool,
) -> Result<InstructionStream, DisasmError> {
    let mut lines: Vec<&str> = text.lines().collect();

    if disassembler_failed {
        let dropped = lines.pop();
        tracing::debug!(?dropped, "dropped trailing disassembler diagnostic");
    }
    if lines.first().is_some_and(|first| !has_address_label(first)) {
        tracing::debug!(banner = lines[0], "skipped leading banner line");
        lines.remove(0);
    }
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(DisasmError::Empty);
    }

    let mut stream = InstructionStream::default();
    for (line_no, raw) in lines.iter().enumerate() {
        let (label, body) = raw.split_once(':').ok_or_else(|| {
            DisasmError::MalformedDisassembly {
                line: line_no,
                msg: "missing `:` separator".to_string(),
                raw: (*raw).to_string(),
            }
        })?;
        let address = usize::from_str_radix(label.trim(), 16).map_err(|_| {
            DisasmError::MalformedDisassembly {
                line: line_no,
                msg: "invalid hex address".to_string(),
                raw: (*raw).to_string(),
            }
        })?;

        let mut parts = body.trim().splitn(2, ' ');
        let mnemonic = parts.next().unwrap_or_default();
        if mnemonic.is_empty() {
            return Err(DisasmError::MalformedDisassembly {
                line: line_no,
                msg: "missing mnemonic".to_string(),
                raw: (*raw).to_string(),
            });
        }
        let operand = parts.next().map(|s| s.trim().to_string());

        let index = stream.instructions.len();
        stream.jump_table.insert(address, index);
        stream.instructions.push(Instruction {
            index,
            address,
            mnemonic: mnemonic.to_string(),
            operand,
        });
    }

    tracing::debug!(
        instructions = stream.len(),
        "parsed disassembly into instruction stream"
    );
    Ok(stream)
}

/// True if the line starts with a `<hex-address>:` label of at least the
/// width `evm disasm` uses, which distinguishes real instruction lines
/// from the raw-bytecode banner some builds print first.
fn has_address_label(line: &str) -> bool {
    match line.split_once(':') {
        Some((label, _)) => {
            let label = label.trim();
            label.len() >= 5 && label.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
