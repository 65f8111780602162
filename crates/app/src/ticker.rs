//! Cancellable periodic background thread.
//!
//! Both the axis sampler and every axis poller run a closure at a fixed
//! period. The thread sleeps on a cancellation channel rather than
//! `thread::sleep`, so [`Ticker::stop`] wakes it immediately.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

#[cfg(test)]
thread_local! {
    static REFUSE_SPAWN: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
}

/// Make `Ticker::spawn` fail on the calling thread until reset.
#[cfg(test)]
pub(crate) fn refuse_spawns(refuse: bool) {
    REFUSE_SPAWN.set(refuse);
}

/// Owns one periodic thread. Dropping it stops the thread.
#[derive(Debug)]
pub(crate) struct Ticker {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a thread calling `tick` every `period` until stopped. The first
    /// tick runs immediately.
    pub(crate) fn spawn<F>(name: String, period: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        #[cfg(test)]
        if REFUSE_SPAWN.get() {
            return Err(io::Error::other("thread spawning refused"));
        }
        let (cancel, cancelled) = crossbeam_channel::bounded::<()>(0);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run(period, &cancelled, &mut tick))?;
        Ok(Self {
            cancel: Some(cancel),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to finish its current tick.
    pub(crate) fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.cancel.take());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("periodic worker panicked");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<F: FnMut()>(period: Duration, cancelled: &Receiver<()>, tick: &mut F) {
    loop {
        tick();
        match cancelled.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Period of a loop running `frequency` times per second.
pub(crate) fn period_of(frequency: u32) -> Duration {
    Duration::from_secs(1) / frequency.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn should_tick_repeatedly_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::spawn("test-ticker".to_string(), Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while count.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        ticker.stop();

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 3);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn should_wake_immediately_when_stopped_during_long_period() {
        let ticker = Ticker::spawn("slow-ticker".to_string(), Duration::from_secs(60), || {}).unwrap();
        let started = Instant::now();
        ticker.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn should_fail_to_spawn_while_refused() {
        refuse_spawns(true);
        let result = Ticker::spawn("refused".to_string(), Duration::from_millis(5), || {});
        refuse_spawns(false);
        assert!(result.is_err());
    }

    #[test]
    fn should_compute_period_from_frequency() {
        assert_eq!(period_of(20), Duration::from_millis(50));
        assert_eq!(period_of(0), Duration::from_secs(1));
    }
}
