//! The full implementation of the chip8 interpreter core, from the
//! machine state down to the instruction semantics.
mod chipset;
mod execute;

/// reexport chipset structs and data for simpler usage
pub use chipset::*;
