use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::api::ApiError;
use crate::models::{Athlete, Event, Resource};

/// Identifies the modal (or list load) a request belongs to. Outcomes whose
/// ticket no longer matches anything on screen are dropped.
pub(crate) type Ticket = u64;

/// Completed request, delivered back to the UI thread.
#[derive(Debug)]
pub(crate) enum Outcome {
    AthletesLoaded {
        generation: Ticket,
        result: Result<Vec<Athlete>, ApiError>,
    },
    EventsLoaded {
        generation: Ticket,
        result: Result<Vec<Event>, ApiError>,
    },
    Saved {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
    Deleted {
        ticket: Ticket,
        result: Result<(), ApiError>,
    },
}

/// Collections that can be listed in the shell.
pub(crate) trait Listed: Resource {
    fn loaded(generation: Ticket, result: Result<Vec<Self>, ApiError>) -> Outcome;
}

impl Listed for Athlete {
    fn loaded(generation: Ticket, result: Result<Vec<Self>, ApiError>) -> Outcome {
        Outcome::AthletesLoaded { generation, result }
    }
}

impl Listed for Event {
    fn loaded(generation: Ticket, result: Result<Vec<Self>, ApiError>) -> Outcome {
        Outcome::EventsLoaded { generation, result }
    }
}

/// Runs request futures on the tokio runtime and queues their outcomes for
/// the single-threaded event loop.
pub(crate) struct TaskQueue {
    runtime: Handle,
    sender: UnboundedSender<Outcome>,
    receiver: UnboundedReceiver<Outcome>,
    in_flight: usize,
}

impl TaskQueue {
    pub(crate) fn new(runtime: Handle) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            runtime,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub(crate) fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        self.in_flight += 1;
        let sender = self.sender.clone();
        self.runtime.spawn(async move {
            // The receiver only goes away with the app itself.
            let _ = sender.send(task.await);
        });
    }

    /// Next finished outcome without blocking.
    pub(crate) fn try_next(&mut self) -> Option<Outcome> {
        let outcome = self.receiver.try_recv().ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }

    /// Block the calling (non-async) thread until the next outcome arrives.
    #[cfg(test)]
    pub(crate) fn next_blocking(&mut self) -> Option<Outcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.receiver.blocking_recv()?;
        self.in_flight -= 1;
        Some(outcome)
    }
}
