use crate::definitions::{display::FrameBuffer, keyboard};

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the display based code
pub trait DisplayCommands {
    /// Will display all of the pixels
    fn display(&mut self, pixels: &FrameBuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the current keyboard state
pub trait KeyboardCommands {
    fn get_keyboard(&self) -> [bool; keyboard::SIZE];
}

/// Will represent the last observed key transition.
#[derive(Debug, Clone, Copy)]
pub struct Key {
    index: usize,
    last: bool,
    current: bool,
}

impl Key {
    fn new(index: usize, last: bool, current: bool) -> Self {
        Self {
            index,
            last,
            current,
        }
    }

    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn get_last(&self) -> bool {
        self.last
    }

    pub fn get_current(&self) -> bool {
        self.current
    }
}

/// The internal input latch.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug)]
pub struct Keyboard {
    /// the pressed state of all sixteen keys
    keys: Box<[bool; keyboard::SIZE]>,
    /// the most recent key transition, kept around until it is
    /// consumed by a pending wait
    last: Option<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    fn reset(&mut self) {
        self.keys.copy_from_slice(&[false; keyboard::SIZE]);
    }

    pub fn set_key(&mut self, key: usize, to: bool) {
        debug_assert!(key < keyboard::SIZE);
        // the previous state has to be read before the reset, a re-sent
        // held key is not a fresh transition
        let previous = self.keys[key];
        self.reset();

        // setup last
        self.last = Some(Key::new(key, previous, to));

        // write back solution
        self.keys[key] = to;
    }

    pub fn set_mult(&mut self, keys: &[bool]) {
        assert!(keys.len() == self.keys.len());
        // remember the first fresh key-down so that a pending wait can
        // observe the transition
        for (i, (old, new)) in self.keys.iter().zip(keys.iter()).enumerate() {
            if *new && !*old {
                self.last = Some(Key::new(i, *old, *new));
                break;
            }
        }
        self.keys.copy_from_slice(keys);
    }

    pub fn get_keys(&self) -> &[bool] {
        &*self.keys
    }

    pub fn get_last(&self) -> Option<Key> {
        self.last
    }

    pub fn clear_last(&mut self) {
        self.last = None;
    }
}
