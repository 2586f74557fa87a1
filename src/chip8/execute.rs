//! The instruction semantics, applied over the decoded table.
use crate::{
    definitions::{cpu, display, memory},
    opcode::{Instruction, Operation, ProgramCounter, ProgramCounterStep},
    timer::TimedWorker,
    MemoryError, ProcessError, StackError,
};

use super::ChipSet;

impl<W: TimedWorker> ChipSet<W> {
    /// Will apply a single decoded instruction to the machine state and
    /// move the program counter accordingly.
    ///
    /// The program counter semantics are the classic ones: every
    /// non-branching instruction advances by one opcode, branch targets
    /// are absolute.
    pub(super) fn execute(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let (step, op) = match instruction {
            Instruction::Clear => {
                // 00E0
                for row in self.display.iter_mut() {
                    for pixel in row.iter_mut() {
                        *pixel = false;
                    }
                }
                (ProgramCounterStep::Next, Operation::Draw)
            }
            Instruction::Return => {
                // 00EE
                // return from subroutine => pop from stack
                let pointer = self.pop_stack().map_err(|err| self.stack_err(err))?;
                (self.jump(pointer)?, Operation::None)
            }
            Instruction::Jump { nnn } => {
                // 1NNN
                (self.jump(nnn)?, Operation::None)
            }
            Instruction::Call { nnn } => {
                // 2NNN
                // store the address of the opcode after the call, so that
                // a later return continues behind it
                let next = self.program_counter + ProgramCounterStep::Next.step();
                self.push_stack(next).map_err(|err| self.stack_err(err))?;
                (self.jump(nnn)?, Operation::None)
            }
            Instruction::SkipEqVal { x, nn } => {
                // 3XNN
                (
                    ProgramCounterStep::cond(self.registers[x] == nn),
                    Operation::None,
                )
            }
            Instruction::SkipNeqVal { x, nn } => {
                // 4XNN
                (
                    ProgramCounterStep::cond(self.registers[x] != nn),
                    Operation::None,
                )
            }
            Instruction::SkipEqReg { x, y } => {
                // 5XY0
                (
                    ProgramCounterStep::cond(self.registers[x] == self.registers[y]),
                    Operation::None,
                )
            }
            Instruction::SetVal { x, nn } => {
                // 6XNN
                self.registers[x] = nn;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::AddVal { x, nn } => {
                // 7XNN
                // let VX overflow, but ignore carry
                self.registers[x] = self.registers[x].wrapping_add(nn);
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Copy { x, y } => {
                // 8XY0
                self.registers[x] = self.registers[y];
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Or { x, y } => {
                // 8XY1
                self.registers[x] |= self.registers[y];
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::And { x, y } => {
                // 8XY2
                self.registers[x] &= self.registers[y];
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Xor { x, y } => {
                // 8XY3
                self.registers[x] ^= self.registers[y];
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Add { x, y } => {
                // 8XY4
                // the carry is derived from the full sum, before the
                // result is truncated back into the register
                let (res, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.registers[x] = res;
                self.registers[cpu::register::LAST] = carry as u8;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Sub { x, y } => {
                // 8XY5
                // VF is the no-borrow indicator, derived from the
                // original operands
                let no_borrow = self.registers[x] >= self.registers[y];
                self.registers[x] = self.registers[x].wrapping_sub(self.registers[y]);
                self.registers[cpu::register::LAST] = no_borrow as u8;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::ShiftRight { x } => {
                // 8XY6
                // VF takes the bit that falls out, captured pre-shift
                let lsb = self.registers[x] & 1;
                self.registers[x] >>= 1;
                self.registers[cpu::register::LAST] = lsb;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::SubNeg { x, y } => {
                // 8XY7
                let no_borrow = self.registers[y] >= self.registers[x];
                self.registers[x] = self.registers[y].wrapping_sub(self.registers[x]);
                self.registers[cpu::register::LAST] = no_borrow as u8;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::ShiftLeft { x } => {
                // 8XYE
                // VF takes the bit that falls out, captured pre-shift
                let msb = self.registers[x] >> 7;
                self.registers[x] <<= 1;
                self.registers[cpu::register::LAST] = msb;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::SkipNeqReg { x, y } => {
                // 9XY0
                (
                    ProgramCounterStep::cond(self.registers[x] != self.registers[y]),
                    Operation::None,
                )
            }
            Instruction::SetIndex { nnn } => {
                // ANNN
                self.index_register = nnn;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::JumpOffset { nnn } => {
                // BNNN
                let v0 = self.registers[0] as usize;
                (self.jump(nnn + v0)?, Operation::None)
            }
            Instruction::Random { x, nn } => {
                // CXNN
                // using a fill_bytes call here, as the trait RngCore does
                // not support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::Draw { x, y, n } => {
                // DXYN
                self.draw(x, y, n)?;
                (ProgramCounterStep::Next, Operation::Draw)
            }
            Instruction::SkipKeyPressed { x } => {
                // EX9E
                (
                    ProgramCounterStep::cond(self.keyboard.get_keys()[self.key_index(x)]),
                    Operation::None,
                )
            }
            Instruction::SkipKeyNotPressed { x } => {
                // EXA1
                (
                    ProgramCounterStep::cond(!self.keyboard.get_keys()[self.key_index(x)]),
                    Operation::None,
                )
            }
            Instruction::GetDelayTimer { x } => {
                // FX07
                self.registers[x] = self.get_delay_timer();
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::AwaitKeyPress { x } => {
                // FX0A
                // suspend the fetch stream, `next` will stay in the wait
                // state until the latch reports a fresh key-down - the
                // program counter already points behind this opcode, so
                // execution resumes there
                self.keyboard.clear_last();
                self.waiting_on_key = Some(x);
                (ProgramCounterStep::Next, Operation::Wait)
            }
            Instruction::SetDelayTimer { x } => {
                // FX15
                self.delay_timer.set_value(self.registers[x]);
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::SetSoundTimer { x } => {
                // FX18
                self.sound_timer.set_value(self.registers[x]);
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::AddIndex { x } => {
                // FX1E
                // no flag is defined for this overflow, the result is
                // masked back into the address space
                let xi = self.registers[x] as usize;
                self.index_register = (self.index_register + xi) & memory::ADDRESS_MASK;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::SetIndexToSprite { x } => {
                // FX29
                // only the low nibble selects a builtin digit sprite
                let val = (self.registers[x] & 0xF) as usize;
                self.index_register =
                    display::fontset::LOCATION + display::fontset::CHAR_HEIGHT * val;
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::StoreBcd { x } => {
                // FX33
                let i = self.index_register;
                self.check_range(i, 3)?;
                let r = self.registers[x];

                self.memory[i] = r / 100; // 246u8 / 100 => 2
                self.memory[i + 1] = r / 10 % 10; // 246u8 / 10 => 24 % 10 => 4
                self.memory[i + 2] = r % 10; // 246u8 % 10 => 6
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::StoreRegisters { x } => {
                // FX55
                let index = self.index_register;
                self.check_range(index, x + 1)?;
                self.memory[index..=(index + x)].copy_from_slice(&self.registers[..=x]);
                (ProgramCounterStep::Next, Operation::None)
            }
            Instruction::FillRegisters { x } => {
                // FX65
                let index = self.index_register;
                self.check_range(index, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[index..=(index + x)]);
                (ProgramCounterStep::Next, Operation::None)
            }
        };

        self.step(step);
        Ok(op)
    }

    /// Draws the 8 pixel wide, `n` pixel high sprite at `memory[I]` onto
    /// the framebuffer by xor-ing every set bit in place.
    ///
    /// The start coordinate wraps around both display edges, the rows
    /// themselves wrap around the right edge and clip at the bottom.
    /// `VF` is set when any pixel flips from set to unset.
    fn draw(&mut self, x: usize, y: usize, n: usize) -> Result<(), ProcessError> {
        let index = self.index_register;
        self.check_range(index, n)?;

        let coorx = self.registers[x] as usize % display::WIDTH;
        let coory = self.registers[y] as usize % display::HEIGHT;

        self.registers[cpu::register::LAST] = 0;

        const BYTE: usize = 8;

        for (i, row) in self.memory[index..(index + n)].iter().enumerate() {
            let y = coory + i;

            // sprites clip at the bottom edge
            if y >= display::HEIGHT {
                break;
            }

            for (m, j) in (0..BYTE).rev().zip(0..BYTE) {
                let mask = 1 << m;
                if row & mask != mask {
                    continue;
                }

                // rows wrap around the right edge
                let x = (coorx + j) % display::WIDTH;

                let spixel = self.display[y][x];
                self.display[y][x] = !spixel;

                if spixel {
                    self.registers[cpu::register::LAST] = 1;
                }
            }
        }
        Ok(())
    }

    /// Branch targets are absolute, anything outside of the program
    /// area is fatal.
    fn jump(&self, pointer: usize) -> Result<ProgramCounterStep, ProcessError> {
        if (cpu::PROGRAM_COUNTER..memory::SIZE).contains(&pointer) {
            Ok(ProgramCounterStep::Jump(pointer))
        } else {
            Err(self.memory_err(MemoryError::InvalidAddress { address: pointer }))
        }
    }

    /// Checks that `from..from + count` stays inside of the ram, raw
    /// memory accesses never wrap.
    fn check_range(&self, from: usize, count: usize) -> Result<(), ProcessError> {
        let to = from + count;
        if to <= self.memory.len() {
            Ok(())
        } else {
            Err(self.memory_err(MemoryError::OutOfBounds {
                from,
                to,
                len: self.memory.len(),
            }))
        }
    }

    /// only the low nibble of a register selects a key
    fn key_index(&self, x: usize) -> usize {
        (self.registers[x] & 0xF) as usize
    }

    fn stack_err(&self, source: StackError) -> ProcessError {
        ProcessError::Stack {
            opcode: self.opcode,
            address: self.program_counter,
            source,
        }
    }

    fn memory_err(&self, source: MemoryError) -> ProcessError {
        ProcessError::Memory {
            opcode: self.opcode,
            address: self.program_counter,
            source,
        }
    }
}
