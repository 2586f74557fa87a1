use thiserror::Error;

use crate::opcode::Opcode;

/// Any failure that aborts the run loop.
///
/// There is no recoverable path here, a malformed state is treated as a
/// defect of the loaded image and never retried. Every variant carries
/// enough context to identify the failing instruction word and its address.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProcessError {
    #[error("{source} (at {address:#05X})")]
    Opcode {
        address: usize,
        source: OpcodeError,
    },
    #[error("{source} (opcode {opcode:#06X} at {address:#05X})")]
    Stack {
        opcode: Opcode,
        address: usize,
        source: StackError,
    },
    #[error("{source} (opcode {opcode:#06X} at {address:#05X})")]
    Memory {
        opcode: Opcode,
        address: usize,
        source: MemoryError,
    },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    Invalid(Opcode),
    #[error("There can not be an opcode at {pointer:#05X}, if the memory len is {len:#05X}.")]
    OutOfBounds { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemoryError {
    #[error("The range {from:#05X}..{to:#05X} lies outside of the {len:#05X} bytes of ram.")]
    OutOfBounds { from: usize, to: usize, len: usize },
    #[error("The branch target {address:#05X} lies outside of the program area.")]
    InvalidAddress { address: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RomError {
    #[error("The program image is {size} bytes long, but only {max} bytes fit into ram.")]
    TooLarge { size: usize, max: usize },
}
