use std::convert::TryFrom;

use {
    crate::{
        definitions::{cpu, display, display::FrameBuffer, memory},
        devices::Keyboard,
        opcode::{self, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        timer::{TimedWorker, Timer, TimerCallback},
        ProcessError, StackError,
    },
    rand::RngCore,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet<W: TimedWorker> {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last fetched opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: usize,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. Up to
    /// `16` levels of nesting are supported, anything beyond that is a
    /// fatal condition.
    pub(super) stack: Vec<usize>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) delay_timer: Timer<W>,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    /// Counts down at 60 hertz, until it reaches 0.
    pub(super) sound_timer: Timer<W>,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`, stored as one boolean per pixel, row-major.
    pub(super) display: Box<FrameBuffer>,
    /// The input latch, owned by the input collaborator and read-only
    /// to the instruction stream.
    pub(super) keyboard: Keyboard,
    /// The register index of a pending `FX0A`. While this is set the
    /// fetch stream is suspended, only the timers keep running.
    pub(super) waiting_on_key: Option<usize>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored in the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl<W: TimedWorker> ChipSet<W> {
    /// will create a new chipset object with the fontset and the
    /// program image installed and everything else zeroed
    pub fn new(rom: Rom) -> Self {
        Self::with_timers(rom, Timer::new(0), Timer::new(0))
    }

    /// will create a new chipset, with the given callback attached to
    /// the sound timer so an audio consumer can observe it
    pub fn with_sound_callback<S: TimerCallback>(rom: Rom, callback: S) -> Self {
        Self::with_timers(rom, Timer::new(0), Timer::with_callback(0, callback))
    }

    fn with_timers(rom: Rom, delay_timer: Timer<W>, sound_timer: Timer<W>) -> Self {
        // initialize all the memory with 0
        let mut ram = vec![0; memory::SIZE];

        // load fonts
        ram[display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        // write the rom data into memory
        ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + rom.get_data().len())]
            .copy_from_slice(rom.get_data());

        Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: ram,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: Vec::with_capacity(cpu::stack::SIZE),
            delay_timer,
            sound_timer,
            display: Box::new([[false; display::WIDTH]; display::HEIGHT]),
            keyboard: Keyboard::new(),
            waiting_on_key: None,
            rng: Box::new(rand::rngs::OsRng {}),
        }
    }

    /// Will exchange the random number generator, so that runs can be
    /// made reproducible.
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }

    /// will advance the program by a single step
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        // a pending `FX0A` suspends the fetch stream until the input
        // latch reports a fresh key-down
        if let Some(x) = self.waiting_on_key {
            // only a fresh key-down transition resumes the stream
            match self
                .keyboard
                .get_last()
                .filter(|key| key.get_current() && !key.get_last())
            {
                Some(key) => {
                    self.registers[x] = key.get_index() as u8;
                    self.waiting_on_key = None;
                }
                None => return Ok(Operation::Wait),
            }
        }

        let pointer = self.program_counter;
        self.opcode = opcode::build_opcode(&self.memory, pointer)
            .map_err(|source| ProcessError::Opcode {
                address: pointer,
                source,
            })?;
        log::debug!("opcode {:#06X} at {:#05X}", self.opcode, pointer);

        let instruction =
            Instruction::try_from(self.opcode).map_err(|source| ProcessError::Opcode {
                address: pointer,
                source,
            })?;

        self.execute(instruction)
    }

    /// will return the name of the loaded rom
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Will write keyboard data into the internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        // set_mult checks the keys length during copy
        self.keyboard.set_mult(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return an immutable reference to the current display state
    pub fn get_display(&self) -> &FrameBuffer {
        &self.display
    }

    /// Will push the given pointer to the stack, the stack depth is
    /// capped at sixteen nested calls
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        if self.stack.len() == cpu::stack::SIZE {
            Err(StackError::Full)
        } else {
            // push to stack
            self.stack.push(pointer);
            Ok(())
        }
    }

    /// Will pop the last return address from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}

impl<W: TimedWorker> ProgramCounter for ChipSet<W> {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = if let ProgramCounterStep::Jump(_) = step {
            step.step()
        } else {
            self.program_counter + step.step()
        }
    }
}
