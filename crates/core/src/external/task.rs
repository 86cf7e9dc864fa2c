use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{BeatlineError, Result};

/// Consumer side of one long-running external call: a completion channel
/// plus an optional stream of transient progress messages. Cancellation is
/// not needed by current behavior; the slot is reserved for it.
#[derive(Debug)]
pub struct ExternalTask<T> {
    progress: Receiver<String>,
    completion: Receiver<Result<T>>,
    cancel: Option<Sender<()>>,
}

impl<T> ExternalTask<T> {
    /// Creates a connected producer/consumer pair.
    pub fn channel() -> (ExternalTaskHandle<T>, ExternalTask<T>) {
        let (progress_tx, progress_rx) = unbounded();
        let (completion_tx, completion_rx) = unbounded();
        (
            ExternalTaskHandle {
                progress: progress_tx,
                completion: completion_tx,
            },
            ExternalTask {
                progress: progress_rx,
                completion: completion_rx,
                cancel: None,
            },
        )
    }

    /// Next pending progress message, if any. Non-blocking.
    pub fn try_progress(&self) -> Option<String> {
        self.progress.try_recv().ok()
    }

    /// Requests cancellation if the producer wired a cancel channel. A no-op
    /// otherwise.
    pub fn request_cancel(&self) {
        if let Some(cancel) = &self.cancel {
            let _ = cancel.send(());
        }
    }

    /// Non-blocking completion check. Returns `None` while the call is
    /// still running.
    pub fn try_result(&self) -> Option<Result<T>> {
        self.completion.try_recv().ok()
    }

    /// Blocks until the call completes. A producer that drops without
    /// reporting counts as a collaborator failure.
    pub fn wait(self) -> Result<T> {
        self.completion
            .recv()
            .map_err(|_| BeatlineError::external("task ended without reporting a result"))?
    }
}

/// Producer side handed to the worker thread driving the external call.
#[derive(Debug, Clone)]
pub struct ExternalTaskHandle<T> {
    progress: Sender<String>,
    completion: Sender<Result<T>>,
}

impl<T> ExternalTaskHandle<T> {
    /// Emits a transient progress message. Dropped silently if the consumer
    /// has gone away.
    pub fn progress(&self, message: impl Into<String>) {
        let _ = self.progress.send(message.into());
    }

    /// Delivers the final result and consumes the handle.
    pub fn finish(self, result: Result<T>) {
        let _ = self.completion.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_progress_then_result() {
        let (handle, task) = ExternalTask::<u32>::channel();
        let worker = std::thread::spawn(move || {
            handle.progress("halfway");
            handle.finish(Ok(42));
        });
        worker.join().unwrap();

        assert_eq!(task.try_progress().as_deref(), Some("halfway"));
        assert_eq!(task.try_progress(), None);
        assert_eq!(task.wait().unwrap(), 42);
    }

    #[test]
    fn dropped_producer_surfaces_as_external_failure() {
        let (handle, task) = ExternalTask::<u32>::channel();
        drop(handle);
        assert!(matches!(task.wait(), Err(BeatlineError::External(_))));
    }

    #[test]
    fn cancel_without_wired_channel_is_a_no_op() {
        let (handle, task) = ExternalTask::<u32>::channel();
        task.request_cancel();
        handle.finish(Ok(1));
        assert_eq!(task.wait().unwrap(), 1);
    }
}
