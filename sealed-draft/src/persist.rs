// Background persistence writer.
//
// Draft transitions hand their new state (and, when a draft starts, its id)
// to the Persister and return at once. A tokio task drains the queue, keeps
// only the newest state and newest id, and runs the blocking store calls on
// the blocking pool. Failures are logged and dropped; they never reach the
// in-memory draft.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::DraftStore;
use crate::draft::state::DraftState;

#[derive(Debug)]
enum PersistRequest {
    Save(Box<DraftState>),
    DraftId(String),
}

/// Everything a single drain of the queue has to write.
#[derive(Debug, Default)]
struct PendingWrite {
    draft_id: Option<String>,
    state: Option<Box<DraftState>>,
}

impl PendingWrite {
    fn absorb(&mut self, request: PersistRequest) {
        match request {
            PersistRequest::Save(state) => self.state = Some(state),
            PersistRequest::DraftId(id) => self.draft_id = Some(id),
        }
    }
}

/// Handle to the background writer task.
pub struct Persister {
    tx: mpsc::UnboundedSender<PersistRequest>,
    handle: JoinHandle<()>,
}

impl Persister {
    /// Spawn the writer on the current tokio runtime.
    pub fn spawn(store: Arc<dyn DraftStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(store, rx));
        Self { tx, handle }
    }

    /// Queue `state` to be saved. Never blocks.
    pub fn save(&self, state: &DraftState) {
        self.send(PersistRequest::Save(Box::new(state.clone())));
    }

    /// Queue the id of the draft being saved. Never blocks.
    pub fn set_draft_id(&self, draft_id: &str) {
        self.send(PersistRequest::DraftId(draft_id.to_string()));
    }

    fn send(&self, request: PersistRequest) {
        if self.tx.send(request).is_err() {
            warn!("Persistence writer has stopped; draft not saved");
        }
    }

    /// Close the queue and wait for pending writes to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!("Persistence writer task failed: {}", e);
        }
    }
}

async fn run_writer(store: Arc<dyn DraftStore>, mut rx: mpsc::UnboundedReceiver<PersistRequest>) {
    info!("Persistence writer started");
    while let Some(first) = rx.recv().await {
        let mut pending = PendingWrite::default();
        pending.absorb(first);
        let mut skipped = 0usize;
        while let Ok(newer) = rx.try_recv() {
            pending.absorb(newer);
            skipped += 1;
        }
        if skipped > 0 {
            debug!("Coalesced {} queued persistence request(s)", skipped);
        }

        let store = Arc::clone(&store);
        let outcome = tokio::task::spawn_blocking(move || {
            if let Some(id) = &pending.draft_id {
                if let Err(e) = store.set_draft_id(id) {
                    warn!("Failed to persist draft id: {:#}", e);
                }
            }
            if let Some(state) = &pending.state {
                if let Err(e) = store.save(state) {
                    warn!("Failed to persist draft state: {:#}", e);
                }
            }
        })
        .await;

        if let Err(e) = outcome {
            warn!("Persistence task panicked: {}", e);
        }
    }
    info!("Persistence writer stopped");
}
