//! Hand-off of display mutations to the UI execution context
//!
//! Fetch tasks finish on arbitrary tokio worker threads. Anything that
//! touches a display target is wrapped in a [`UiJob`] and handed to a
//! [`Dispatcher`], which runs it on whichever context owns the targets.

use tokio::sync::mpsc;

/// A unit of work that must run on the UI context
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Schedules jobs onto the UI context
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: UiJob);
}

/// Runs every job inline on the calling thread
///
/// For hosts whose targets are internally synchronized and have no
/// dedicated UI thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Dispatcher for Immediate {
    fn dispatch(&self, job: UiJob) {
        job();
    }
}

/// Sending half of a UI job queue
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<UiJob>,
}

impl Dispatcher for QueueDispatcher {
    fn dispatch(&self, job: UiJob) {
        // The queue is gone only when the UI context has shut down, at
        // which point there is nothing left to update.
        if self.tx.send(job).is_err() {
            tracing::debug!("UI queue closed, dropping job");
        }
    }
}

/// Receiving half of a UI job queue, drained by the UI context
///
/// Jobs run in submission order.
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiJob>,
}

impl UiQueue {
    /// Run every job queued so far without waiting, returning how many ran
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next job and run it
    ///
    /// Returns `false` once every dispatcher has been dropped and the
    /// queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}

/// Create a connected dispatcher/queue pair
pub fn ui_queue() -> (QueueDispatcher, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueDispatcher { tx }, UiQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn immediate_runs_inline() {
        let hits = Arc::new(Mutex::new(0));
        let h = Arc::clone(&hits);
        Immediate.dispatch(Box::new(move || *h.lock().unwrap() += 1));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn queue_defers_until_drained() {
        let (dispatcher, mut queue) = ui_queue();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            dispatcher.dispatch(Box::new(move || log.lock().unwrap().push(i)));
        }
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[tokio::test]
    async fn run_next_ends_when_dispatchers_dropped() {
        let (dispatcher, mut queue) = ui_queue();
        dispatcher.dispatch(Box::new(|| {}));
        drop(dispatcher);

        assert!(queue.run_next().await);
        assert!(!queue.run_next().await);
    }

    #[test]
    fn dispatch_after_queue_dropped_is_silent() {
        let (dispatcher, queue) = ui_queue();
        drop(queue);
        dispatcher.dispatch(Box::new(|| panic!("must not run")));
    }
}
