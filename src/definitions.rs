//! The fixed machine definitions

pub mod memory {
    /// The size of the chipset ram
    pub const SIZE: usize = 0x1000; // 4096

    /// The mask applied when an instruction wraps an address on purpose,
    /// raw addresses never wrap silently
    pub const ADDRESS_MASK: usize = SIZE - 1;

    /// opcode information
    pub mod opcodes {
        /// The step used for calculating the program counter increments
        pub const SIZE: usize = 2;
    }
}

/// The definitions for the cpu
pub mod cpu {
    /// The starting point for the program
    pub const PROGRAM_COUNTER: usize = 0x0200;
    /// The amount of hertz the interpretation shall run at.
    pub const HERTZ: u64 = 500;
    /// The amount of milliseconds between two instructions
    pub const INTERVAL: u64 = 1000 / HERTZ;

    /// The definitions needed for the register
    pub(crate) mod register {
        /// The size of the chip set registers
        pub const SIZE: usize = 16;
        /// The last entry of the registers, doubling as the
        /// carry / borrow / collision flag
        pub const LAST: usize = SIZE - 1;
    }

    /// The stack definitions
    pub(crate) mod stack {
        /// The count of nesting entries
        pub const SIZE: usize = 16;
    }
}

/// The timer definitions
pub mod timer {
    /// The rate at which both counters are decremented,
    /// independent of the instruction rate
    pub const HERTZ: u8 = 60;
    /// The amount of milliseconds between two decrements
    pub const INTERVAL: u64 = 1000 / HERTZ as u64;
}

/// The display definitions
pub mod display {
    /// The amount of pixels per row
    pub const WIDTH: usize = 64;
    /// The amount of rows
    pub const HEIGHT: usize = 32;

    /// The monochrome framebuffer, stored row-major.
    pub type FrameBuffer = [[bool; WIDTH]; HEIGHT];

    /// The fontset information
    pub mod fontset {
        /// Is the location of the beginning of the font in memory
        pub const LOCATION: usize = 0x50;
        /// The height in bytes of a single digit sprite
        pub const CHAR_HEIGHT: usize = 5;
        /// The font set characters to be rendered on the screen
        pub const FONTSET: [u8; 80] = [
            0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
            0x20, 0x60, 0x20, 0x20, 0x70, // 1
            0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
            0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
            0x90, 0x90, 0xF0, 0x10, 0x10, // 4
            0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
            0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
            0xF0, 0x10, 0x20, 0x40, 0x40, // 7
            0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
            0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
            0xF0, 0x90, 0xF0, 0x90, 0x90, // A
            0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
            0xF0, 0x80, 0x80, 0x80, 0xF0, // C
            0xE0, 0x90, 0x90, 0x90, 0xE0, // D
            0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
            0xF0, 0x80, 0xF0, 0x80, 0x80, // F
        ];
    }
}

/// The definitions needed for correct keyboard handling.
pub mod keyboard {
    /// all the different keyboard entries
    pub const SIZE: usize = 16;
}
