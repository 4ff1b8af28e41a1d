use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Sender, TryRecvError};
use log::{trace, warn};

use crate::error::MetronomeError;

/// Fixed-period repeating task with explicit cancellation
///
/// The first firing happens one `interval` after arming. Cancelling joins the
/// timer thread, so once `cancel()` returns no further tick can run.
pub struct TickTimer {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    interval: Duration,
}

impl TickTimer {
    pub fn arm<F>(interval: Duration, mut on_tick: F) -> Result<Self, MetronomeError>
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = bounded::<()>(0);

        let thread = thread::Builder::new()
            .name("metronome-tick".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(cancel_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            // A cancel that raced this tick wins
                            if !matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty)) {
                                break;
                            }
                            on_tick();
                        }
                    }
                }
                trace!("Tick timer stopped");
            })
            .map_err(|e| MetronomeError::TimerSpawn(e.to_string()))?;

        trace!("Tick timer armed at {:?}", interval);

        Ok(Self {
            cancel: Some(cancel_tx),
            thread: Some(thread),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the timer and wait for its thread to exit
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the cancel channel
        drop(self.cancel.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Tick timer thread panicked");
            }
        }
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
