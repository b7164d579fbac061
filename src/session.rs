//! Editing session state and the batch-save workflow.
//!
//! An [`EditorSession`] owns the fetched episode collection, the pending
//! change set, and per-row statuses, so multiple sessions (or tests) can run
//! in isolation. Data flows one direction per cycle: fetch, edit, save,
//! re-fetch.

use crate::api::{EpisodeBackend, fetch_all_episodes};
use crate::error::Result;
use crate::tracker::{EditableField, PendingChanges};
use crate::types::{Episode, UpdatePayload};
use log::{info, warn};
use std::collections::HashMap;

/// Visual status of one episode row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Clean,
    /// Has at least one tracked edit not yet confirmed saved.
    Dirty,
    /// An update request for this episode is in flight.
    Saving,
    /// Saved successfully during the last batch run.
    Saved,
    /// The last update request for this episode failed.
    Failed,
}

impl RowStatus {
    /// One-character marker for the table's status column.
    pub fn marker(&self) -> &'static str {
        match self {
            RowStatus::Clean => " ",
            RowStatus::Dirty => "*",
            RowStatus::Saving => ">",
            RowStatus::Saved => "+",
            RowStatus::Failed => "!",
        }
    }
}

/// Aggregate result of one batch-save run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success_count: usize,
    pub total_count: usize,
}

impl SaveOutcome {
    /// Format the tally for the aggregate status message.
    pub fn to_display(&self) -> String {
        format!("Saved {} of {} episodes", self.success_count, self.total_count)
    }
}

/// Owns one fetch/edit/save cycle's state.
#[derive(Debug, Default)]
pub struct EditorSession {
    episodes: Vec<Episode>,
    pending: PendingChanges,
    statuses: HashMap<String, RowStatus>,
}

impl EditorSession {
    /// Create an empty session; call [`EditorSession::refresh`] to populate it.
    pub fn new() -> Self {
        Self {
            episodes: Vec::new(),
            pending: PendingChanges::new(),
            statuses: HashMap::new(),
        }
    }

    /// The fetched episodes, in server order.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Look up one episode by id.
    pub fn episode(&self, episode_id: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.id == episode_id)
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Number of episodes with unsaved edits.
    pub fn dirty_count(&self) -> usize {
        self.pending.dirty_count()
    }

    /// Whether any episode has unsaved edits.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The row status for an episode; unknown ids read as clean.
    pub fn status(&self, episode_id: &str) -> RowStatus {
        self.statuses.get(episode_id).copied().unwrap_or_default()
    }

    /// The value a field currently shows: the tracked edit when present,
    /// the fetched baseline otherwise.
    pub fn current_value(&self, episode_id: &str, field: EditableField) -> Option<String> {
        if let Some(edit) = self.pending.get(episode_id, field) {
            return Some(edit.to_string());
        }
        self.episode(episode_id).map(|ep| field.baseline_of(ep))
    }

    /// Record one edit event from the UI, marking the row dirty.
    ///
    /// Edits for ids outside the fetched collection are dropped; without a
    /// baseline there is nothing to layer them over.
    pub fn record_edit(&mut self, episode_id: &str, field: EditableField, value: &str) {
        if self.episode(episode_id).is_none() {
            warn!("Ignoring edit for unknown episode {}", episode_id);
            return;
        }
        self.pending.record_edit(episode_id, field, value);
        self.statuses.insert(episode_id.to_string(), RowStatus::Dirty);
    }

    /// The update payload for one episode: tracked edits layered over the
    /// baseline required fields.
    pub fn data_to_save(&self, episode_id: &str) -> Option<UpdatePayload> {
        self.episode(episode_id)
            .map(|ep| self.pending.build_payload(ep))
    }

    /// Ids with unsaved edits, in collection order. Taken once at the start
    /// of a batch run; edits made while the run is in flight wait for the
    /// next one.
    pub fn snapshot_dirty_ids(&self) -> Vec<String> {
        self.episodes
            .iter()
            .filter(|e| self.pending.is_dirty(&e.id))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Rebuild the collection from the server and drop all local state.
    ///
    /// The collection is replaced wholesale (no incremental merge), the
    /// pending set is emptied, and every row reads clean again.
    pub async fn refresh<B: EpisodeBackend>(&mut self, backend: &B, token: &str) -> Result<()> {
        let episodes = fetch_all_episodes(backend, token).await?;
        self.episodes = episodes;
        self.pending.clear();
        self.statuses.clear();
        Ok(())
    }

    /// Send the update for one episode.
    ///
    /// On success the episode's pending entry is dropped and the row reads
    /// saved; on failure the row reads failed and the error is returned for
    /// tallying. Callers never abort a batch over it and nothing is retried.
    pub async fn save_episode<B: EpisodeBackend>(
        &mut self,
        backend: &B,
        token: &str,
        episode_id: &str,
    ) -> Result<()> {
        let Some(payload) = self.data_to_save(episode_id) else {
            warn!("Skipping save for unknown episode {}", episode_id);
            return Ok(());
        };

        self.statuses
            .insert(episode_id.to_string(), RowStatus::Saving);

        match backend.update_episode(token, episode_id, &payload).await {
            Ok(_) => {
                info!("Saved episode {}", episode_id);
                self.pending.clear_episode(episode_id);
                self.statuses
                    .insert(episode_id.to_string(), RowStatus::Saved);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save episode {}: {}", episode_id, e);
                self.statuses
                    .insert(episode_id.to_string(), RowStatus::Failed);
                Err(e)
            }
        }
    }

    /// Re-fetch after a batch run, keeping failed markers visible.
    ///
    /// The re-fetch discards any edits that failed to save (the server is
    /// the system of record), but rows that failed stay marked so the user
    /// can tell which episodes need re-editing.
    pub async fn refresh_after_save<B: EpisodeBackend>(
        &mut self,
        backend: &B,
        token: &str,
    ) -> Result<()> {
        let failed: Vec<String> = self
            .statuses
            .iter()
            .filter(|(_, s)| **s == RowStatus::Failed)
            .map(|(id, _)| id.clone())
            .collect();

        self.refresh(backend, token).await?;

        for id in failed {
            if self.episode(&id).is_some() {
                self.statuses.insert(id, RowStatus::Failed);
            }
        }
        Ok(())
    }

    /// Save every dirty episode sequentially, then reconcile with the server.
    ///
    /// Operates on a snapshot of the dirty ids taken at invocation start.
    /// One episode's failure never aborts the batch; failures are logged and
    /// tallied, and the caller only learns the aggregate count. The re-fetch
    /// runs unconditionally afterwards.
    pub async fn save_all<B: EpisodeBackend>(
        &mut self,
        backend: &B,
        token: &str,
    ) -> Result<SaveOutcome> {
        let ids = self.snapshot_dirty_ids();
        let total_count = ids.len();
        let mut success_count = 0;

        for (idx, id) in ids.iter().enumerate() {
            info!("Saving episode {} of {}", idx + 1, total_count);
            if self.save_episode(backend, token, id).await.is_ok() {
                success_count += 1;
            }
        }

        info!("Batch save finished: {} of {} succeeded", success_count, total_count);
        self.refresh_after_save(backend, token).await?;

        Ok(SaveOutcome {
            success_count,
            total_count,
        })
    }
}
