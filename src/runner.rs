use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    timer::TimedWorker,
};

/// The handle onto a running interpreter.
///
/// Stopping is cooperative: the run flag is checked at every instruction
/// boundary, so no instruction is ever left partially applied. A pending
/// key wait is cancelled by the same mechanism.
pub struct RunController<W: TimedWorker> {
    worker: W,
    run_flag: Arc<AtomicBool>,
}

impl<W: TimedWorker> RunController<W> {
    pub fn is_running(&self) -> bool {
        self.run_flag.load(Ordering::Acquire) && self.worker.is_alive()
    }

    /// Will stop the interpreter at the next instruction boundary.
    pub fn stop(&mut self) {
        self.run_flag.store(false, Ordering::Release);
        self.worker.stop();
    }
}

/// Will drive the given chipset at the instruction rate, feeding it the
/// keyboard state before every step and handing the framebuffer to the
/// display consumer whenever a draw happened.
///
/// Any error out of the step loop is fatal: it is logged with the
/// failing instruction word and its address, and the loop stops.
pub fn run<D, K, W>(mut display: D, keyboard: K, mut chip: ChipSet<W>) -> RunController<W>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    W: TimedWorker + Send + 'static,
{
    let run_flag = Arc::new(AtomicBool::new(true));
    let flag = run_flag.clone();

    let inner_run = move || {
        if !flag.load(Ordering::Acquire) {
            return;
        }

        chip.set_keyboard(&keyboard.get_keyboard());

        match chip.next() {
            Ok(Operation::Draw) => {
                /* draw the screen */
                display.display(chip.get_display());
            }
            Ok(_) => { /* neither a redraw nor input is needed */ }
            Err(err) => {
                log::error!("aborting the run loop: {}", err);
                flag.store(false, Ordering::Release);
            }
        }
    };

    let mut worker = W::new();
    worker.start(inner_run, Duration::from_millis(cpu::INTERVAL));

    RunController { worker, run_flag }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::keyboard,
        devices::{MockDisplayCommands, MockKeyboardCommands},
        resources::Rom,
        timer::Worker,
    };

    /// clear the screen, then jump back to the start
    const DRAW_LOOP: &[u8] = &[0x00, 0xE0, 0x12, 0x00];

    #[test]
    fn test_run_draws_and_stops() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().times(1..).return_const(());

        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_get_keyboard()
            .return_const([false; keyboard::SIZE]);

        let rom = Rom::new("DRAWLOOP", DRAW_LOOP).unwrap();
        let chip: ChipSet<Worker> = ChipSet::new(rom);

        let mut controller = run(display, keyboard, chip);
        assert!(controller.is_running());

        std::thread::sleep(Duration::from_millis(50));

        controller.stop();
        assert!(!controller.is_running());
    }
}
