//! Consumer side of the pipeline.
//!
//! `WorkflowConsumer` owns the parse, route, mark-terminal sequence for a
//! single message body. `spawn`/`spawn_pool` wrap it in long-running worker
//! threads fed by a transport subscription.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info, warn};

use ledgerflow_events::{EnvelopeError, EventRouter, RoutingError, Transport, parse_envelope};

use crate::record_store::{RecordStore, RecordStoreError};
use crate::status_tracker::StatusTracker;

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// The message body was not a recognizable envelope. No status is
    /// written; the submission record stays RECEIVED.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Routing failed. A FAILED status write is attempted best-effort before
    /// this surfaces.
    #[error(transparent)]
    Routing(RoutingError),

    /// The terminal status write failed after successful routing.
    #[error(transparent)]
    Status(#[from] RecordStoreError),
}

/// Processes transport messages end to end.
pub struct WorkflowConsumer<S> {
    router: EventRouter,
    tracker: StatusTracker<S>,
}

impl<S: RecordStore> WorkflowConsumer<S> {
    pub fn new(router: EventRouter, tracker: StatusTracker<S>) -> Self {
        Self { router, tracker }
    }

    /// Run one message body through the pipeline.
    ///
    /// Parse failures are logged and surfaced without touching the record
    /// store. Routing failures mark the event FAILED (best-effort) and then
    /// surface. Reprocessing a message that already reached a terminal
    /// status simply rewrites the same status, which keeps redelivery safe.
    pub fn process(&self, body: &str) -> Result<(), ConsumeError> {
        let event = match parse_envelope(body) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "dropping unparseable message");
                return Err(ConsumeError::Envelope(e));
            }
        };

        info!(
            event_id = %event.event_id,
            detail_type = %event.detail_type,
            "processing event"
        );

        match self.router.route(&event) {
            Ok(()) => {
                self.tracker.mark_terminal(&event.event_id, &Ok(()))?;
                Ok(())
            }
            Err(routing_err) => {
                if let Err(status_err) = self
                    .tracker
                    .mark_terminal(&event.event_id, &Err(routing_err.clone()))
                {
                    warn!(
                        event_id = %event.event_id,
                        error = %status_err,
                        "failed to record FAILED status"
                    );
                }
                Err(ConsumeError::Routing(routing_err))
            }
        }
    }
}

/// Handle to a running consumer worker.
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Signal the worker to stop and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl<S: RecordStore + 'static> WorkflowConsumer<S> {
    /// Spawn a worker thread consuming from a fresh subscription.
    ///
    /// The subscription is taken before the thread starts, so no message
    /// published after this call returns can be missed.
    ///
    /// Acknowledgement policy: a processed message is acked, and so is an
    /// unparseable one (there is no key to retry under, redelivery would
    /// fail identically). Routing and status-write failures leave the
    /// message unacknowledged so the transport can redeliver it.
    pub fn spawn<T>(self: &Arc<Self>, name: String, transport: &T) -> WorkerHandle
    where
        T: Transport + Clone + 'static,
    {
        let subscription = transport.subscribe();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let consumer = Arc::clone(self);
        let transport = transport.clone();

        let join = thread::Builder::new()
            .name(name)
            .spawn(move || {
                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        info!("consumer worker shutting down");
                        return;
                    }

                    match subscription.recv_timeout(POLL_INTERVAL) {
                        Ok(message) => {
                            let outcome = consumer.process(&message.body);

                            match &outcome {
                                Ok(()) | Err(ConsumeError::Envelope(_)) => {
                                    if let Some(receipt) = &message.receipt {
                                        if let Err(e) = transport.ack(receipt) {
                                            warn!(
                                                error = ?e,
                                                receipt = %receipt,
                                                "failed to acknowledge message"
                                            );
                                        }
                                    }
                                }
                                Err(_) => {}
                            }

                            if let Err(e) = outcome {
                                warn!(error = %e, "message processing failed");
                            }
                        }
                        Err(mpsc::RecvTimeoutError::Timeout) => {}
                        Err(mpsc::RecvTimeoutError::Disconnected) => {
                            info!("transport subscription closed, worker exiting");
                            return;
                        }
                    }
                }
            })
            .expect("failed to spawn consumer worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }

    /// Spawn a pool of identical workers, each with its own subscription.
    pub fn spawn_pool<T>(
        self: &Arc<Self>,
        name_prefix: &str,
        transport: &T,
        count: usize,
    ) -> Vec<WorkerHandle>
    where
        T: Transport + Clone + 'static,
    {
        (0..count)
            .map(|i| self.spawn(format!("{name_prefix}-{i}"), transport))
            .collect()
    }
}
