//! Pending-edit tracking for podbean-editor.
//!
//! This module records per-episode, per-field edits made through the UI
//! without mutating the fetched records, and composes update payloads by
//! layering those edits over the last-fetched baseline.

use crate::types::{Episode, EpisodeType, UpdatePayload};
use log::warn;
use std::collections::HashMap;

/// The episode fields a user can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditableField {
    Title,
    Content,
    Summary,
    Author,
    SeasonNo,
    EpisodeNo,
    EpisodeType,
    ContentExplicit,
}

impl EditableField {
    /// The wire/form name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditableField::Title => "title",
            EditableField::Content => "content",
            EditableField::Summary => "summary",
            EditableField::Author => "author",
            EditableField::SeasonNo => "season_no",
            EditableField::EpisodeNo => "episode_no",
            EditableField::EpisodeType => "episode_type",
            EditableField::ContentExplicit => "content_explicit",
        }
    }

    /// Whether this field only accepts digits when edited.
    pub fn is_numeric(&self) -> bool {
        matches!(self, EditableField::SeasonNo | EditableField::EpisodeNo)
    }

    /// The baseline (last-fetched) value of this field, as edit text.
    pub fn baseline_of(&self, episode: &Episode) -> String {
        match self {
            EditableField::Title => episode.title.clone(),
            EditableField::Content => episode.content.clone(),
            EditableField::Summary => episode.summary.clone(),
            EditableField::Author => episode.author.clone(),
            EditableField::SeasonNo => {
                episode.season_no.map(|n| n.to_string()).unwrap_or_default()
            }
            EditableField::EpisodeNo => {
                episode.episode_no.map(|n| n.to_string()).unwrap_or_default()
            }
            EditableField::EpisodeType => episode.episode_type.as_str().to_string(),
            EditableField::ContentExplicit => {
                let text = if episode.content_explicit { "true" } else { "false" };
                text.to_string()
            }
        }
    }
}

/// Locally tracked edits, keyed by episode id and field.
///
/// A field only appears in an episode's map if the user actually edited it
/// since the last successful save or fetch; the whole set is the
/// authoritative diff against the last-fetched collection. Cleared wholesale
/// on every re-fetch, and per-episode once that episode saves successfully.
#[derive(Debug, Clone, Default)]
pub struct PendingChanges {
    edits: HashMap<String, HashMap<EditableField, String>>,
}

impl PendingChanges {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self {
            edits: HashMap::new(),
        }
    }

    /// Record an edit. Idempotent upsert: re-recording the same
    /// `(id, field, value)` leaves the set unchanged.
    pub fn record_edit(&mut self, episode_id: &str, field: EditableField, value: &str) {
        self.edits
            .entry(episode_id.to_string())
            .or_default()
            .insert(field, value.to_string());
    }

    /// Whether the episode has at least one tracked edit.
    pub fn is_dirty(&self, episode_id: &str) -> bool {
        self.edits
            .get(episode_id)
            .map(|fields| !fields.is_empty())
            .unwrap_or(false)
    }

    /// The tracked value of one field, if edited.
    pub fn get(&self, episode_id: &str, field: EditableField) -> Option<&str> {
        self.edits
            .get(episode_id)
            .and_then(|fields| fields.get(&field))
            .map(|s| s.as_str())
    }

    /// Number of episodes with tracked edits.
    pub fn dirty_count(&self) -> usize {
        self.edits.values().filter(|f| !f.is_empty()).count()
    }

    /// Whether any episode has tracked edits.
    pub fn is_empty(&self) -> bool {
        self.dirty_count() == 0
    }

    /// Drop the tracked edits for one episode after a confirmed save.
    pub fn clear_episode(&mut self, episode_id: &str) {
        self.edits.remove(episode_id);
    }

    /// Drop all tracked edits. Called on every re-fetch.
    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// Compose the update payload for `episode` by layering its tracked
    /// edits over the baseline required fields.
    ///
    /// `status` and `episode_type` are always present, sourced from the
    /// baseline when unedited. Blank or unparseable numeric edits are
    /// omitted from the payload rather than sent as empty strings, which
    /// the remote API rejects.
    pub fn build_payload(&self, episode: &Episode) -> UpdatePayload {
        let mut payload = UpdatePayload::baseline(episode);

        let Some(fields) = self.edits.get(&episode.id) else {
            return payload;
        };

        for (field, value) in fields {
            match field {
                EditableField::Title => payload.title = Some(value.clone()),
                EditableField::Content => payload.content = Some(value.clone()),
                EditableField::Summary => payload.summary = Some(value.clone()),
                EditableField::Author => payload.author = Some(value.clone()),
                EditableField::SeasonNo => {
                    payload.season_no = parse_number_edit(&episode.id, "season_no", value);
                }
                EditableField::EpisodeNo => {
                    payload.episode_no = parse_number_edit(&episode.id, "episode_no", value);
                }
                EditableField::EpisodeType => match EpisodeType::from_name(value) {
                    Some(t) => payload.episode_type = t,
                    None => warn!(
                        "Episode {}: unknown episode type '{}', keeping baseline",
                        episode.id, value
                    ),
                },
                EditableField::ContentExplicit => {
                    payload.content_explicit = parse_explicit_edit(&episode.id, value);
                }
            }
        }

        payload
    }
}

/// Blank edits become omissions; unparseable edits are dropped with a
/// warning instead of failing the save.
fn parse_number_edit(episode_id: &str, name: &str, value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(
                "Episode {}: ignoring non-numeric {} edit '{}'",
                episode_id, name, value
            );
            None
        }
    }
}

fn parse_explicit_edit(episode_id: &str, value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        warn!(
            "Episode {}: ignoring non-boolean content_explicit edit '{}'",
            episode_id, value
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: "Original Title".to_string(),
            content: "<p>Body</p>".to_string(),
            summary: "Original summary".to_string(),
            author: "Host".to_string(),
            season_no: None,
            episode_no: None,
            episode_type: EpisodeType::Full,
            content_explicit: false,
            status: "publish".to_string(),
        }
    }

    #[test]
    fn test_new_set_is_empty() {
        let pending = PendingChanges::new();
        assert!(pending.is_empty());
        assert_eq!(pending.dirty_count(), 0);
        assert!(!pending.is_dirty("ep_1"));
    }

    #[test]
    fn test_record_edit_marks_dirty() {
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "New Title");

        assert!(pending.is_dirty("ep_1"));
        assert!(!pending.is_dirty("ep_2"));
        assert_eq!(pending.get("ep_1", EditableField::Title), Some("New Title"));
        assert_eq!(pending.dirty_count(), 1);
    }

    #[test]
    fn test_record_edit_is_idempotent() {
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "New Title");
        let before = pending.clone();

        pending.record_edit("ep_1", EditableField::Title, "New Title");
        assert_eq!(pending.get("ep_1", EditableField::Title), Some("New Title"));
        assert_eq!(pending.dirty_count(), before.dirty_count());
    }

    #[test]
    fn test_record_edit_overwrites_value() {
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "First");
        pending.record_edit("ep_1", EditableField::Title, "Second");

        assert_eq!(pending.get("ep_1", EditableField::Title), Some("Second"));
        assert_eq!(pending.dirty_count(), 1);
    }

    #[test]
    fn test_clear_episode() {
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "New Title");
        pending.record_edit("ep_2", EditableField::Author, "New Host");

        pending.clear_episode("ep_1");
        assert!(!pending.is_dirty("ep_1"));
        assert!(pending.is_dirty("ep_2"));

        pending.clear();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_payload_preserves_required_fields() {
        let mut ep = episode("ep_1");
        ep.status = "draft".to_string();
        ep.episode_type = EpisodeType::Trailer;

        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "New Title");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.title, Some("New Title".to_string()));
        assert_eq!(payload.status, "draft");
        assert_eq!(payload.episode_type, EpisodeType::Trailer);
    }

    #[test]
    fn test_payload_boolean_coercion() {
        let ep = episode("ep_1");
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::ContentExplicit, "true");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.content_explicit, Some(true));

        let form = payload.to_form();
        assert!(form.contains(&("content_explicit", "true".to_string())));

        pending.record_edit("ep_1", EditableField::ContentExplicit, "false");
        let form = pending.build_payload(&ep).to_form();
        assert!(form.contains(&("content_explicit", "false".to_string())));
    }

    #[test]
    fn test_payload_omits_blank_numeric_edit() {
        let mut ep = episode("ep_1");
        ep.season_no = Some(2);

        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::SeasonNo, "");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.season_no, None);

        let keys: Vec<&str> = payload.to_form().iter().map(|(k, _)| *k).collect();
        assert!(!keys.contains(&"season_no"));
    }

    #[test]
    fn test_payload_omits_unparseable_numeric_edit() {
        let ep = episode("ep_1");
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::EpisodeNo, "abc");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.episode_no, None);
    }

    #[test]
    fn test_payload_numeric_edit_parses() {
        let ep = episode("ep_1");
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::SeasonNo, " 4 ");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.season_no, Some(4));
    }

    #[test]
    fn test_payload_unknown_type_edit_keeps_baseline() {
        let mut ep = episode("ep_1");
        ep.episode_type = EpisodeType::Bonus;

        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::EpisodeType, "minisode");

        let payload = pending.build_payload(&ep);
        assert_eq!(payload.episode_type, EpisodeType::Bonus);
    }

    #[test]
    fn test_payload_for_unedited_episode_is_baseline_only() {
        let ep = episode("ep_1");
        let pending = PendingChanges::new();

        let payload = pending.build_payload(&ep);
        let keys: Vec<&str> = payload.to_form().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["status", "episode_type"]);
    }

    /// Editing only the title still sends baseline status/type, and no
    /// numeric keys that were never set.
    #[test]
    fn test_title_only_edit_scenario() {
        let ep = episode("ep_1");
        let mut pending = PendingChanges::new();
        pending.record_edit("ep_1", EditableField::Title, "New Title");

        let payload = pending.build_payload(&ep);
        let form = payload.to_form();
        let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();

        assert!(form.contains(&("title", "New Title".to_string())));
        assert!(form.contains(&("status", "publish".to_string())));
        assert!(form.contains(&("episode_type", "full".to_string())));
        assert!(!keys.contains(&"season_no"));
        assert!(!keys.contains(&"episode_no"));
    }

    #[test]
    fn test_baseline_of() {
        let mut ep = episode("ep_1");
        ep.season_no = Some(2);

        assert_eq!(
            EditableField::Title.baseline_of(&ep),
            "Original Title".to_string()
        );
        assert_eq!(EditableField::SeasonNo.baseline_of(&ep), "2".to_string());
        assert_eq!(EditableField::EpisodeNo.baseline_of(&ep), "".to_string());
        assert_eq!(EditableField::EpisodeType.baseline_of(&ep), "full".to_string());
        assert_eq!(
            EditableField::ContentExplicit.baseline_of(&ep),
            "false".to_string()
        );
    }
}
