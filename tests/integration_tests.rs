//! Integration tests for podbean-editor.
//!
//! These tests drive the full fetch/edit/save/re-fetch cycle across
//! modules, using a mock backend in place of the network.

use podbean_editor::api::{EpisodeBackend, PAGE_LIMIT, fetch_all_episodes};
use podbean_editor::error::{AppError, Result};
use podbean_editor::session::{EditorSession, RowStatus};
use podbean_editor::tracker::{EditableField, PendingChanges};
use podbean_editor::types::{Episode, EpisodeType, UpdatePayload};
use std::cell::RefCell;
use std::collections::HashSet;

fn episode(id: &str, title: &str) -> Episode {
    Episode {
        id: id.to_string(),
        title: title.to_string(),
        content: "<p>Show notes</p>".to_string(),
        summary: "A summary".to_string(),
        author: "Host".to_string(),
        season_no: None,
        episode_no: None,
        episode_type: EpisodeType::Full,
        content_explicit: false,
        status: "publish".to_string(),
    }
}

/// Backend over an in-memory episode list. Pages honor offset/limit,
/// updates apply their payload, ids in `fail_ids` reject updates.
struct FakeServer {
    episodes: RefCell<Vec<Episode>>,
    fail_ids: HashSet<String>,
    requests: RefCell<Vec<usize>>,
}

impl FakeServer {
    fn new(count: usize) -> Self {
        let episodes = (0..count)
            .map(|i| episode(&format!("ep_{}", i), &format!("Episode {}", i)))
            .collect();
        Self {
            episodes: RefCell::new(episodes),
            fail_ids: HashSet::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn failing_on(mut self, id: &str) -> Self {
        self.fail_ids.insert(id.to_string());
        self
    }
}

impl EpisodeBackend for FakeServer {
    async fn fetch_page(&self, _token: &str, offset: usize, limit: usize) -> Result<Vec<Episode>> {
        self.requests.borrow_mut().push(offset);
        let episodes = self.episodes.borrow();
        if offset >= episodes.len() {
            return Ok(Vec::new());
        }
        let end = (offset + limit).min(episodes.len());
        Ok(episodes[offset..end].to_vec())
    }

    async fn update_episode(
        &self,
        _token: &str,
        episode_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Episode> {
        if self.fail_ids.contains(episode_id) {
            return Err(AppError::Save("rejected".to_string()));
        }

        let mut episodes = self.episodes.borrow_mut();
        let ep = episodes
            .iter_mut()
            .find(|e| e.id == episode_id)
            .ok_or_else(|| AppError::Save("unknown episode".to_string()))?;

        ep.status = payload.status.clone();
        ep.episode_type = payload.episode_type;
        if let Some(v) = &payload.title {
            ep.title = v.clone();
        }
        if let Some(v) = &payload.summary {
            ep.summary = v.clone();
        }
        if let Some(v) = payload.season_no {
            ep.season_no = Some(v);
        }
        if let Some(v) = payload.content_explicit {
            ep.content_explicit = v;
        }
        Ok(ep.clone())
    }
}

/// Fetching 237 episodes takes 4 page requests at offsets 0, 100, 200, 237.
#[tokio::test]
async fn test_fetch_paginates_until_exhausted() {
    let server = FakeServer::new(237);

    let episodes = fetch_all_episodes(&server, "token").await.unwrap();
    assert_eq!(episodes.len(), 237);
    assert_eq!(*server.requests.borrow(), vec![0, 100, 200, 237]);

    // Server order is preserved end to end.
    assert_eq!(episodes[0].id, "ep_0");
    assert_eq!(episodes[236].id, "ep_236");
}

/// A list shorter than one page still needs the terminating empty page.
#[tokio::test]
async fn test_fetch_short_list() {
    let server = FakeServer::new(37);

    let episodes = fetch_all_episodes(&server, "token").await.unwrap();
    assert_eq!(episodes.len(), 37);
    assert_eq!(*server.requests.borrow(), vec![0, 37]);
    assert!(37 < PAGE_LIMIT);
}

/// Full cycle: fetch, edit a title, save, and the server's echo survives
/// the reconciling re-fetch.
#[tokio::test]
async fn test_edit_save_refetch_cycle() {
    let server = FakeServer::new(3);
    let mut session = EditorSession::new();
    session.refresh(&server, "token").await.unwrap();

    session.record_edit("ep_1", EditableField::Title, "Renamed");
    assert_eq!(session.status("ep_1"), RowStatus::Dirty);
    assert_eq!(session.dirty_count(), 1);

    let outcome = session.save_all(&server, "token").await.unwrap();
    assert_eq!(outcome.success_count, 1);
    assert_eq!(outcome.total_count, 1);

    assert_eq!(session.episode("ep_1").unwrap().title, "Renamed");
    assert!(!session.has_pending());
    assert_eq!(session.status("ep_1"), RowStatus::Clean);
}

/// One failing episode is isolated: the rest save, the tally says 2 of 3,
/// and the re-fetch still runs, discarding the failed edit.
#[tokio::test]
async fn test_batch_save_isolates_failures() {
    let server = FakeServer::new(3).failing_on("ep_1");
    let mut session = EditorSession::new();
    session.refresh(&server, "token").await.unwrap();

    session.record_edit("ep_0", EditableField::Title, "First");
    session.record_edit("ep_1", EditableField::Title, "Second");
    session.record_edit("ep_2", EditableField::Title, "Third");

    let requests_before = server.requests.borrow().len();
    let outcome = session.save_all(&server, "token").await.unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.total_count, 3);
    assert!(server.requests.borrow().len() > requests_before);

    assert_eq!(session.episode("ep_0").unwrap().title, "First");
    assert_eq!(session.episode("ep_1").unwrap().title, "Episode 1");
    assert_eq!(session.episode("ep_2").unwrap().title, "Third");
    assert_eq!(session.status("ep_1"), RowStatus::Failed);
}

/// Partial edits never drop required fields from the update payload.
#[tokio::test]
async fn test_update_payload_keeps_required_fields() {
    let server = FakeServer::new(1);
    let mut session = EditorSession::new();
    session.refresh(&server, "token").await.unwrap();

    session.record_edit("ep_0", EditableField::ContentExplicit, "true");
    let payload = session.data_to_save("ep_0").unwrap();

    let form = payload.to_form();
    assert!(form.contains(&("status", "publish".to_string())));
    assert!(form.contains(&("episode_type", "full".to_string())));
    assert!(form.contains(&("content_explicit", "true".to_string())));

    session.save_all(&server, "token").await.unwrap();
    assert!(session.episode("ep_0").unwrap().content_explicit);
}

/// Blank numeric edits are omitted, not sent as empty strings.
#[test]
fn test_blank_season_edit_is_omitted() {
    let mut ep = episode("ep_0", "Pilot");
    ep.season_no = Some(2);

    let mut pending = PendingChanges::new();
    pending.record_edit("ep_0", EditableField::SeasonNo, "");

    let form = pending.build_payload(&ep).to_form();
    let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();
    assert!(!keys.contains(&"season_no"));
}

/// Editing during a batch run: ids snapshotted at the start are the whole
/// batch; later edits stay pending for the next run.
#[tokio::test]
async fn test_edits_after_snapshot_wait_for_next_batch() {
    let server = FakeServer::new(3);
    let mut session = EditorSession::new();
    session.refresh(&server, "token").await.unwrap();

    session.record_edit("ep_0", EditableField::Author, "New Host");
    let snapshot = session.snapshot_dirty_ids();
    assert_eq!(snapshot, vec!["ep_0"]);

    // An edit arriving after the snapshot is not part of this batch.
    session.record_edit("ep_2", EditableField::Author, "Other Host");
    assert_eq!(session.snapshot_dirty_ids().len(), 2);
    assert_eq!(snapshot.len(), 1);
}

/// Re-fetch rebuilds the collection wholesale and empties the change set.
#[tokio::test]
async fn test_refresh_discards_pending_edits() {
    let server = FakeServer::new(2);
    let mut session = EditorSession::new();
    session.refresh(&server, "token").await.unwrap();

    session.record_edit("ep_0", EditableField::Title, "Unsaved");
    assert!(session.has_pending());

    session.refresh(&server, "token").await.unwrap();
    assert!(!session.has_pending());
    assert_eq!(session.episode("ep_0").unwrap().title, "Episode 0");
}
