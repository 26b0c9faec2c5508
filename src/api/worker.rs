use super::client::{TaskClient, Transport};
use super::wire::{ListParams, TaskListing};
use super::ApiError;
use crate::domain::{TaskDraft, TaskPatch};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Sequence number attached to list requests
pub type Seq = u64;

/// Why an update was sent; decides how its outcome is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// Checkbox toggle. `previous` is the state to restore on failure.
    Completion { id: String, previous: bool },
    /// Submission of the edit form
    Edit,
}

/// Where an added task came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddKind {
    /// Submission of the add form
    Form,
    /// Accepted from the generated preview
    Generated,
}

/// Work for the API thread
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCommand {
    List { seq: Seq, params: ListParams },
    Add { draft: TaskDraft, kind: AddKind },
    Update { patch: TaskPatch, kind: UpdateKind },
    Delete { id: String },
    Generate { meeting_id: String },
}

/// Result of one command, sent back to the UI loop
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Listed { seq: Seq, result: Result<TaskListing, ApiError> },
    Added { kind: AddKind, result: Result<(), ApiError> },
    Updated { kind: UpdateKind, result: Result<(), ApiError> },
    Deleted { id: String, result: Result<(), ApiError> },
    Generated { result: Result<Vec<TaskDraft>, ApiError> },
}

/// Run a single command against the API
pub fn execute<T: Transport>(client: &TaskClient<T>, command: ApiCommand) -> ApiOutcome {
    match command {
        ApiCommand::List { seq, params } => ApiOutcome::Listed {
            seq,
            result: client.list(params),
        },
        ApiCommand::Add { draft, kind } => ApiOutcome::Added {
            kind,
            result: client.add(draft),
        },
        ApiCommand::Update { patch, kind } => ApiOutcome::Updated {
            kind,
            result: client.update(patch),
        },
        ApiCommand::Delete { id } => {
            let result = client.delete(id.clone());
            ApiOutcome::Deleted { id, result }
        }
        ApiCommand::Generate { meeting_id } => ApiOutcome::Generated {
            result: client.generate_from_summary(meeting_id),
        },
    }
}

/// Background thread that executes API commands in order.
///
/// The UI loop sends commands through [`ApiWorker::sender`] and drains
/// outcomes with [`ApiWorker::try_recv`]; it never blocks on the network.
pub struct ApiWorker {
    commands: Option<Sender<ApiCommand>>,
    outcomes: Receiver<ApiOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl ApiWorker {
    pub fn spawn<T: Transport + 'static>(client: TaskClient<T>) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<ApiCommand>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<ApiOutcome>();

        let handle = thread::Builder::new()
            .name("task-api".to_string())
            .spawn(move || {
                // Exits when every sender has been dropped
                for command in command_rx {
                    debug!(?command, "executing api command");
                    let outcome = execute(&client, command);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("api worker stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "failed to spawn api worker thread");
                None
            }
        };

        Self {
            commands: Some(command_tx),
            outcomes: outcome_rx,
            handle,
        }
    }

    /// A handle for queueing commands
    pub fn sender(&self) -> Sender<ApiCommand> {
        match &self.commands {
            Some(tx) => tx.clone(),
            // Only reachable after shutdown; commands go nowhere
            None => mpsc::channel().0,
        }
    }

    /// Next finished outcome, if any
    pub fn try_recv(&self) -> Option<ApiOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Stop accepting commands and wait for the thread.
    ///
    /// Other senders handed out by [`ApiWorker::sender`] must be dropped
    /// first or this waits for them.
    pub fn shutdown(mut self) {
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("api worker thread panicked");
            }
        }
    }
}
