//! Opcode abstractions, the field extractors and the flattened decode table.
use std::convert::TryFrom;

use crate::{definitions::memory, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
///
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcode
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1`
/// make the opcode up
///
/// # Example
/// ```rust
/// # use chip8_core::opcode::*;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::OutOfBounds {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode class from any opcode
    fn t(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `NNN` is an address
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` and `Y` are register indexes
    /// - `N` is a constant or an opcode subtype
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `X` and `Y` are register indexes
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip8_core::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1000);
    /// ```
    fn t(&self) -> usize {
        (self & OPCODE_MASK_F000) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip8_core::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip8_core::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip8_core::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as usize;
        (x, y, n)
    }

    /// ```rust
    /// # use chip8_core::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip8_core::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

/// One concrete instruction with its decoded operand fields.
///
/// The table is flattened on purpose, one variant per instruction, so
/// that the match in the executor stays exhaustive and an unimplemented
/// case is caught at build time instead of at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - Clears the screen.
    Clear,
    /// `00EE` - Returns from a subroutine.
    Return,
    /// `1NNN` - Jumps to address `NNN`.
    Jump { nnn: usize },
    /// `2NNN` - Calls subroutine at `NNN`.
    Call { nnn: usize },
    /// `3XNN` - Skips the next instruction if `VX` equals `NN`.
    SkipEqVal { x: usize, nn: u8 },
    /// `4XNN` - Skips the next instruction if `VX` doesn't equal `NN`.
    SkipNeqVal { x: usize, nn: u8 },
    /// `5XY0` - Skips the next instruction if `VX` equals `VY`.
    SkipEqReg { x: usize, y: usize },
    /// `6XNN` - Sets `VX` to `NN`.
    SetVal { x: usize, nn: u8 },
    /// `7XNN` - Adds `NN` to `VX`. (Carry flag is not changed)
    AddVal { x: usize, nn: u8 },
    /// `8XY0` - Sets `VX` to the value of `VY`.
    Copy { x: usize, y: usize },
    /// `8XY1` - Sets `VX` to `VX` or `VY`.
    Or { x: usize, y: usize },
    /// `8XY2` - Sets `VX` to `VX` and `VY`.
    And { x: usize, y: usize },
    /// `8XY3` - Sets `VX` to `VX` xor `VY`.
    Xor { x: usize, y: usize },
    /// `8XY4` - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry,
    /// and to `0` when there isn't.
    Add { x: usize, y: usize },
    /// `8XY5` - `VY` is subtracted from `VX`. `VF` is set to `0` when there's
    /// a borrow, and `1` when there isn't.
    Sub { x: usize, y: usize },
    /// `8XY6` - Stores the least significant bit of `VX` in `VF` and then
    /// shifts `VX` to the right by `1`.
    ShiftRight { x: usize },
    /// `8XY7` - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's
    /// a borrow, and `1` when there isn't.
    SubNeg { x: usize, y: usize },
    /// `8XYE` - Stores the most significant bit of `VX` in `VF` and then
    /// shifts `VX` to the left by `1`.
    ShiftLeft { x: usize },
    /// `9XY0` - Skips the next instruction if `VX` doesn't equal `VY`.
    SkipNeqReg { x: usize, y: usize },
    /// `ANNN` - Sets `I` to the address `NNN`.
    SetIndex { nnn: usize },
    /// `BNNN` - Jumps to the address `NNN` plus `V0`.
    JumpOffset { nnn: usize },
    /// `CXNN` - Sets `VX` to the result of a bitwise and operation on a
    /// random number and `NN`.
    Random { x: usize, nn: u8 },
    /// `DXYN` - Draws the 8 pixel wide, `N` pixel high sprite at `memory[I]`
    /// to the coordinate `(VX, VY)`. `VF` is set upon pixel collision.
    Draw { x: usize, y: usize, n: usize },
    /// `EX9E` - Skips the next instruction if the key stored in `VX` is
    /// pressed.
    SkipKeyPressed { x: usize },
    /// `EXA1` - Skips the next instruction if the key stored in `VX` isn't
    /// pressed.
    SkipKeyNotPressed { x: usize },
    /// `FX07` - Sets `VX` to the value of the delay timer.
    GetDelayTimer { x: usize },
    /// `FX0A` - A key press is awaited, and then stored in `VX`. (Blocking
    /// Operation. All instructions halted until the next key event)
    AwaitKeyPress { x: usize },
    /// `FX15` - Sets the delay timer to `VX`.
    SetDelayTimer { x: usize },
    /// `FX18` - Sets the sound timer to `VX`.
    SetSoundTimer { x: usize },
    /// `FX1E` - Adds `VX` to `I`. `VF` is not affected.
    AddIndex { x: usize },
    /// `FX29` - Sets `I` to the location of the builtin sprite for the
    /// character in `VX`.
    SetIndexToSprite { x: usize },
    /// `FX33` - Stores the binary-coded decimal representation of `VX` at
    /// `I`, `I + 1` and `I + 2`.
    StoreBcd { x: usize },
    /// `FX55` - Stores `V0` to `VX` (including `VX`) in memory starting at
    /// address `I`. `I` itself is left unmodified.
    StoreRegisters { x: usize },
    /// `FX65` - Fills `V0` to `VX` (including `VX`) with values from memory
    /// starting at address `I`. `I` itself is left unmodified.
    FillRegisters { x: usize },
}

#[inline]
fn err(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    Err(OpcodeError::Invalid(opcode))
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        // shifting t here so that the match sees the plain top nibble
        const SHIFT: usize = 4 * 3;
        let res = match opcode.t() >> SHIFT {
            0x0 => match opcode {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => return err(opcode),
            },
            0x1 => Instruction::Jump { nnn: opcode.nnn() },
            0x2 => Instruction::Call { nnn: opcode.nnn() },
            0x3 => {
                let (x, nn) = opcode.xnn();
                Instruction::SkipEqVal { x, nn }
            }
            0x4 => {
                let (x, nn) = opcode.xnn();
                Instruction::SkipNeqVal { x, nn }
            }
            0x5 => match opcode.xyn() {
                (x, y, 0x0) => Instruction::SkipEqReg { x, y },
                _ => return err(opcode),
            },
            0x6 => {
                let (x, nn) = opcode.xnn();
                Instruction::SetVal { x, nn }
            }
            0x7 => {
                let (x, nn) = opcode.xnn();
                Instruction::AddVal { x, nn }
            }
            0x8 => {
                let (x, y, n) = opcode.xyn();
                match n {
                    0x0 => Instruction::Copy { x, y },
                    0x1 => Instruction::Or { x, y },
                    0x2 => Instruction::And { x, y },
                    0x3 => Instruction::Xor { x, y },
                    0x4 => Instruction::Add { x, y },
                    0x5 => Instruction::Sub { x, y },
                    0x6 => Instruction::ShiftRight { x },
                    0x7 => Instruction::SubNeg { x, y },
                    0xE => Instruction::ShiftLeft { x },
                    _ => return err(opcode),
                }
            }
            0x9 => match opcode.xyn() {
                (x, y, 0x0) => Instruction::SkipNeqReg { x, y },
                _ => return err(opcode),
            },
            0xA => Instruction::SetIndex { nnn: opcode.nnn() },
            0xB => Instruction::JumpOffset { nnn: opcode.nnn() },
            0xC => {
                let (x, nn) = opcode.xnn();
                Instruction::Random { x, nn }
            }
            0xD => {
                let (x, y, n) = opcode.xyn();
                Instruction::Draw { x, y, n }
            }
            0xE => {
                let (x, nn) = opcode.xnn();
                match nn {
                    0x9E => Instruction::SkipKeyPressed { x },
                    0xA1 => Instruction::SkipKeyNotPressed { x },
                    _ => return err(opcode),
                }
            }
            0xF => {
                let (x, nn) = opcode.xnn();
                match nn {
                    0x07 => Instruction::GetDelayTimer { x },
                    0x0A => Instruction::AwaitKeyPress { x },
                    0x15 => Instruction::SetDelayTimer { x },
                    0x18 => Instruction::SetSoundTimer { x },
                    0x1E => Instruction::AddIndex { x },
                    0x29 => Instruction::SetIndexToSprite { x },
                    0x33 => Instruction::StoreBcd { x },
                    0x55 => Instruction::StoreRegisters { x },
                    0x65 => Instruction::FillRegisters { x },
                    _ => return err(opcode),
                }
            }
            // the top nibble is four bits, nothing else can show up here
            _ => return err(opcode),
        };
        Ok(res)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program counter movements that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next opcode
    Next,
    /// Will skip over the next opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip8_core::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the [`ProgramCounterStep`](ProgramCounterStep) to the
    /// corresponding movement distance.
    #[inline]
    pub fn step(&self) -> usize {
        match *self {
            ProgramCounterStep::Next => memory::opcodes::SIZE,
            ProgramCounterStep::Skip => 2 * memory::opcodes::SIZE,
            ProgramCounterStep::None => 0,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the frontend.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// If the frontend shall wait for the next key press.
    Wait,
    /// A redraw command.
    Draw,
}
