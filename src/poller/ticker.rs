//! Repeating timer owned by the poller while live mode is on.
//!
//! A [`Ticker`] runs its callback on a background thread every `interval`
//! until it is cancelled or dropped. Dropping it stops the loop and waits
//! for the thread, so no refresh can outlive its owner.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};

#[derive(Debug)]
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start calling `on_tick` every `interval`. The first call happens one
    /// full interval after spawning. A tick that runs longer than the
    /// interval delays the next one instead of queueing extra calls.
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stopped) = bounded::<()>(1);
        let handle = thread::spawn(move || {
            let ticks = tick(interval);
            loop {
                select! {
                    // A stop message or a dropped sender both end the loop.
                    recv(stopped) -> _ => break,
                    recv(ticks) -> _ => on_tick(),
                }
            }
        });

        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for an in-progress tick to finish.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
