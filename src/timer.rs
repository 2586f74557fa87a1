//! The 60 Hz countdown timers and the periodic worker that drives them.
use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        mpsc::{self, RecvTimeoutError, SyncSender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::definitions::timer;

/// A hook that is run on every timer tick while the counter is active.
///
/// The sound consumer can use this to observe a non-zero sound timer,
/// tone generation itself is entirely outside of the core.
pub trait TimerCallback: Send + 'static {
    fn handle(&mut self);
}

/// The callback that does nothing, for timers nobody listens to.
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

/// Represents a countdown timer inside of the chip infrastructure.
///
/// It will count down to zero from whatever value is set, at a fixed
/// 60 hertz, independent of the instruction rate.
pub struct Timer<W: TimedWorker> {
    /// This is the worker that decrements the value,
    /// it is kept around only for its lifetime.
    _worker: W,
    /// will store the value of the timer
    value: Arc<AtomicU8>,
}

impl<W: TimedWorker> Timer<W> {
    /// Will create a new timer with the given value.
    pub fn new(value: u8) -> Self {
        Self::setup(value, |_| {})
    }

    /// Will create a new timer that runs the given callback on every
    /// tick during which the counter was still active.
    pub fn with_callback<S: TimerCallback>(value: u8, mut callback: S) -> Self {
        Self::setup(value, move |previous| {
            if previous > 0 {
                callback.handle();
            }
        })
    }

    fn setup<F>(value: u8, mut on_tick: F) -> Self
    where
        F: FnMut(u8) + Send + 'static,
    {
        let counter = Arc::new(AtomicU8::new(value));
        // used to move into the callback
        let ccounter = counter.clone();
        let tick = move || {
            // the instruction thread may swap in a new start value at
            // any moment, so the decrement has to be a single atomic
            // update - and it never drops below zero
            let previous = match ccounter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |val| {
                val.checked_sub(1)
            }) {
                Ok(val) | Err(val) => val,
            };
            on_tick(previous);
        };

        let mut worker = W::new();
        worker.start(tick, Duration::from_millis(timer::INTERVAL));

        assert!(
            worker.is_alive(),
            "Something went wrong while initializing the worker thread!"
        );
        Self {
            _worker: worker,
            value: counter,
        }
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&mut self, value: u8) {
        self.value.swap(value, Ordering::SeqCst);
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Anything that can periodically run a callback, used to pace both the
/// timers and the instruction loop.
pub trait TimedWorker {
    fn new() -> Self;
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// The thread backed worker.
pub struct Worker {
    /// Contains the actual thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefully shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the actual threads used (this is never more than 2, but
    /// is simple to use). It uses an `()` so that it doesn't use
    /// up too much memory.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// every interval.
    /// Attention: the worker assumes that the callback will finish
    /// calculation faster than the given interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static,
    {
        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            // this is to count the references, as it will not actually
            // be used `_` is used in front of the name.
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = std::time::Instant::now();

                        // run the callback function
                        callback();

                        // make sure the system will at most wait the interval
                        let duration = start.elapsed();
                        timeout = if interval <= duration {
                            Duration::from_secs(0)
                        } else {
                            interval - duration
                        };
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker.
    fn stop(&mut self) {
        // Will stop the worker, in two steps one by sending an empty message
        // and second by dropping the only sender for the given receiver.
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .expect("Something went wrong with joining the worker thread.")
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    /// Will drop the worker
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_down_to_zero() {
        let mut timer: Timer<Worker> = Timer::new(timer::HERTZ);
        assert!(timer._worker.is_alive());

        std::thread::sleep(Duration::from_millis(1200));
        assert_eq!(timer.get_value(), 0);

        timer._worker.stop();
        assert!(!timer._worker.is_alive());
    }

    #[test]
    fn test_timer_set_value() {
        let mut timer: Timer<Worker> = Timer::new(0);
        timer.set_value(42);
        // a tick might have happened in between
        assert!(timer.get_value() >= 41);
    }

    #[test]
    fn test_timer_callback_fires_while_active() {
        use std::sync::atomic::AtomicUsize;

        struct CountingCallback(Arc<AtomicUsize>);

        impl TimerCallback for CountingCallback {
            fn handle(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let _timer: Timer<Worker> = Timer::with_callback(3, CountingCallback(calls.clone()));

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
