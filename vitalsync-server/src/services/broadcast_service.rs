use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;
use vitalsync_api::Snapshot;

use crate::errors::BroadcastError;

/// A serialized snapshot, shared by every viewer queue.
pub type Frame = Arc<str>;

/// Registry of connected viewers. Every published snapshot is serialized once
/// and queued to each viewer; a viewer whose queue is closed is dropped.
#[derive(Default)]
pub struct ViewerHub {
    state: RwLock<HubState>,
}

// Viewers and the last frame share one lock so a subscriber sees each frame exactly once
#[derive(Default)]
struct HubState {
    viewers: HashMap<Uuid, mpsc::UnboundedSender<Frame>>,
    latest: Option<Frame>,
}

impl ViewerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a viewer. The last published frame, if any, is queued first.
    pub async fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<Frame>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut state = self.state.write().await;
        if let Some(frame) = state.latest.clone() {
            let _ = tx.send(frame);
        }
        state.viewers.insert(id, tx);
        drop(state);

        tracing::debug!("viewer {} subscribed", id);

        (id, rx)
    }

    pub async fn unsubscribe(&self, viewer_id: &Uuid) {
        if self.state.write().await.viewers.remove(viewer_id).is_some() {
            tracing::debug!("viewer {} unsubscribed", viewer_id);
        }
    }

    pub async fn viewer_count(&self) -> usize {
        self.state.read().await.viewers.len()
    }

    pub async fn latest(&self) -> Option<Frame> {
        self.state.read().await.latest.clone()
    }

    /// Serializes the snapshot and fans it out. Returns how many viewers accepted it.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<usize, BroadcastError> {
        let frame: Frame = serde_json::to_string(snapshot)?.into();

        Ok(self.publish_frame(frame).await)
    }

    pub async fn publish_frame(&self, frame: Frame) -> usize {
        let mut state = self.state.write().await;
        state.latest = Some(frame.clone());

        let mut delivered = 0;
        state.viewers.retain(|id, sender| {
            if sender.send(frame.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                tracing::warn!("Failed to send snapshot to viewer: {}", id);
                false
            }
        });

        delivered
    }
}
