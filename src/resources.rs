use crate::{
    definitions::{cpu, memory},
    RomError,
};

/// The amount of ram left for a program image behind the interpreter area.
pub const MAX_PROGRAM_SIZE: usize = memory::SIZE - cpu::PROGRAM_COUNTER;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single program image with its information.
///
/// The loader collaborator supplies the raw bytes, the core only checks
/// that they fit into ram and takes them over verbatim. An image that
/// does not fit is rejected as a whole.
pub struct Rom {
    /// The rom name
    name: String,
    /// The program image bytes, stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based off the given data
    pub fn new(name: &str, data: &[u8]) -> Result<Self, RomError> {
        if data.len() > MAX_PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                size: data.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        // there might be a case where there is an uneven amount of
        // data entries, adding one for simplicity
        let size = data.len() + data.len() % 2;
        let mut padded = vec![0; size].into_boxed_slice();
        padded[..data.len()].copy_from_slice(data);
        Ok(Rom {
            name: name.to_string(),
            data: padded,
        })
    }

    /// Will return a slice of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_keeps_data() {
        let data = [0x00, 0xE0, 0x12, 0x00];
        let rom = Rom::new("TESTROM", &data).unwrap();
        assert_eq!(rom.get_name(), "TESTROM");
        assert_eq!(rom.get_data(), data);
    }

    #[test]
    fn test_rom_pads_uneven_image() {
        let data = [0x00, 0xE0, 0x12];
        let rom = Rom::new("UNEVEN", &data).unwrap();
        assert_eq!(rom.get_data(), [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_rom_rejects_oversized_image() {
        let data = vec![0x0; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            Rom::new("TOOBIG", &data),
            Err(RomError::TooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max: MAX_PROGRAM_SIZE,
            })
        );
    }

    #[test]
    fn test_rom_accepts_maximum_image() {
        let data = vec![0x0; MAX_PROGRAM_SIZE];
        assert!(Rom::new("FULL", &data).is_ok());
    }
}
