//! Type definitions for the podbean-editor application.
//!
//! This module contains the core data structures used throughout the
//! application for representing episodes and episode update payloads.

use log::warn;
use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Episode publishing type, as used by the remote API.
///
/// Unknown wire values decode as [`EpisodeType::Full`] so a single odd
/// record cannot abort a whole fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeType {
    #[default]
    Full,
    Trailer,
    Bonus,
}

impl EpisodeType {
    /// Parse an episode type name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "full" => Some(EpisodeType::Full),
            "trailer" => Some(EpisodeType::Trailer),
            "bonus" => Some(EpisodeType::Bonus),
            _ => None,
        }
    }

    /// The wire representation of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeType::Full => "full",
            EpisodeType::Trailer => "trailer",
            EpisodeType::Bonus => "bonus",
        }
    }

    /// Cycle to the next type, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            EpisodeType::Full => EpisodeType::Trailer,
            EpisodeType::Trailer => EpisodeType::Bonus,
            EpisodeType::Bonus => EpisodeType::Full,
        }
    }
}

/// One podcast episode as fetched from the remote API.
///
/// `id` is immutable and unique within a fetch session. `status` is
/// server-controlled and must be echoed back unchanged on update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Rich-text HTML body.
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub author: String,

    #[serde(default, deserialize_with = "lenient_u32")]
    pub season_no: Option<u32>,

    #[serde(default, deserialize_with = "lenient_u32")]
    pub episode_no: Option<u32>,

    #[serde(default, deserialize_with = "lenient_episode_type")]
    pub episode_type: EpisodeType,

    /// Serialized as the literal strings `"true"`/`"false"` on the wire.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub content_explicit: bool,

    #[serde(default)]
    pub status: String,
}

impl Episode {
    /// Format the episode for the detail pane.
    ///
    /// # Examples
    ///
    /// ```
    /// use podbean_editor::types::{Episode, EpisodeType};
    ///
    /// let ep = Episode {
    ///     id: "ep_1".to_string(),
    ///     title: "Pilot".to_string(),
    ///     content: String::new(),
    ///     summary: String::new(),
    ///     author: String::new(),
    ///     season_no: Some(1),
    ///     episode_no: Some(3),
    ///     episode_type: EpisodeType::Full,
    ///     content_explicit: false,
    ///     status: "publish".to_string(),
    /// };
    /// assert_eq!(ep.to_display(), "Pilot [S1E3]");
    /// ```
    pub fn to_display(&self) -> String {
        match self.number_label() {
            Some(label) => format!("{} [{}]", self.title, label),
            None => self.title.clone(),
        }
    }

    /// Season/episode label like "S1E3", or `None` when both are absent.
    pub fn number_label(&self) -> Option<String> {
        match (self.season_no, self.episode_no) {
            (Some(s), Some(e)) => Some(format!("S{}E{}", s, e)),
            (Some(s), None) => Some(format!("S{}", s)),
            (None, Some(e)) => Some(format!("E{}", e)),
            (None, None) => None,
        }
    }
}

/// Fields sent to the episode update endpoint.
///
/// The remote API treats an update as a full replace of required fields, so
/// `status` and `episode_type` are always present even when unedited.
/// Optional fields are omitted from the request entirely when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    /// Server-controlled; echoed back from the baseline unchanged.
    pub status: String,
    pub episode_type: EpisodeType,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub season_no: Option<u32>,
    pub episode_no: Option<u32>,
    pub content_explicit: Option<bool>,
}

impl UpdatePayload {
    /// A payload carrying only the baseline required fields of `episode`.
    pub fn baseline(episode: &Episode) -> Self {
        Self {
            status: episode.status.clone(),
            episode_type: episode.episode_type,
            title: None,
            content: None,
            summary: None,
            author: None,
            season_no: None,
            episode_no: None,
            content_explicit: None,
        }
    }

    /// Render the payload as form key/value pairs for the update request.
    ///
    /// `content_explicit` is emitted as the literal strings `"true"` or
    /// `"false"`; the remote API expects form-encoded text, not a JSON
    /// boolean.
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("status", self.status.clone()),
            ("episode_type", self.episode_type.as_str().to_string()),
        ];

        if let Some(v) = &self.title {
            form.push(("title", v.clone()));
        }
        if let Some(v) = &self.content {
            form.push(("content", v.clone()));
        }
        if let Some(v) = &self.summary {
            form.push(("summary", v.clone()));
        }
        if let Some(v) = &self.author {
            form.push(("author", v.clone()));
        }
        if let Some(v) = self.season_no {
            form.push(("season_no", v.to_string()));
        }
        if let Some(v) = self.episode_no {
            form.push(("episode_no", v.to_string()));
        }
        if let Some(v) = self.content_explicit {
            let text = if v { "true" } else { "false" };
            form.push(("content_explicit", text.to_string()));
        }

        form
    }
}

/// Accept an integer, a numeric string, or an empty/absent value.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u32),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        }
    })
}

/// Accept a boolean or the strings `"true"`/`"false"`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => false,
        Some(Raw::Bool(b)) => b,
        Some(Raw::Text(s)) => s.trim().eq_ignore_ascii_case("true"),
    })
}

/// Accept a type name, falling back to `full` for unknown values.
fn lenient_episode_type<'de, D>(deserializer: D) -> Result<EpisodeType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<String>::deserialize(deserializer)? {
        None => EpisodeType::default(),
        Some(s) => EpisodeType::from_name(&s).unwrap_or_else(|| {
            warn!("Unknown episode type '{}', treating as 'full'", s);
            EpisodeType::default()
        }),
    })
}

/// Strip HTML tags and common entities from rich-text content.
///
/// Used to preview the `content` and `summary` fields in table cells;
/// whitespace runs are collapsed to single spaces.
///
/// # Examples
///
/// ```
/// use podbean_editor::types::strip_html;
///
/// let text = strip_html("<p>Hello <b>world</b></p>");
/// assert_eq!(text, "Hello world");
/// ```
pub fn strip_html(input: &str) -> String {
    let re = Regex::new(r"<[^>]*>").unwrap();
    let no_tags = re.replace_all(input, " ");

    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: "Test Episode".to_string(),
            content: String::new(),
            summary: String::new(),
            author: String::new(),
            season_no: None,
            episode_no: None,
            episode_type: EpisodeType::Full,
            content_explicit: false,
            status: "publish".to_string(),
        }
    }

    #[test]
    fn test_episode_type_from_name() {
        assert_eq!(EpisodeType::from_name("full"), Some(EpisodeType::Full));
        assert_eq!(EpisodeType::from_name("Trailer"), Some(EpisodeType::Trailer));
        assert_eq!(EpisodeType::from_name(" bonus "), Some(EpisodeType::Bonus));
        assert_eq!(EpisodeType::from_name("season"), None);
    }

    #[test]
    fn test_episode_type_cycle() {
        assert_eq!(EpisodeType::Full.next(), EpisodeType::Trailer);
        assert_eq!(EpisodeType::Trailer.next(), EpisodeType::Bonus);
        assert_eq!(EpisodeType::Bonus.next(), EpisodeType::Full);
    }

    #[test]
    fn test_episode_deserialization_lenient() {
        let json = r#"{
            "id": "ep_1",
            "title": "Pilot",
            "season_no": "2",
            "episode_no": "",
            "episode_type": "bonus",
            "content_explicit": "true",
            "status": "publish"
        }"#;

        let ep: Episode = serde_json::from_str(json).unwrap();
        assert_eq!(ep.season_no, Some(2));
        assert_eq!(ep.episode_no, None);
        assert_eq!(ep.episode_type, EpisodeType::Bonus);
        assert!(ep.content_explicit);
    }

    #[test]
    fn test_episode_deserialization_minimal() {
        let ep: Episode = serde_json::from_str(r#"{"id": "ep_2"}"#).unwrap();
        assert_eq!(ep.id, "ep_2");
        assert_eq!(ep.title, "");
        assert_eq!(ep.season_no, None);
        assert_eq!(ep.episode_type, EpisodeType::Full);
        assert!(!ep.content_explicit);
    }

    #[test]
    fn test_episode_deserialization_unknown_type() {
        let ep: Episode =
            serde_json::from_str(r#"{"id": "ep_3", "episode_type": "minisode"}"#).unwrap();
        assert_eq!(ep.episode_type, EpisodeType::Full);
    }

    #[test]
    fn test_number_label() {
        let mut ep = episode("ep_1");
        assert_eq!(ep.number_label(), None);

        ep.season_no = Some(1);
        assert_eq!(ep.number_label(), Some("S1".to_string()));

        ep.episode_no = Some(4);
        assert_eq!(ep.number_label(), Some("S1E4".to_string()));

        ep.season_no = None;
        assert_eq!(ep.number_label(), Some("E4".to_string()));
    }

    #[test]
    fn test_payload_baseline_carries_required_fields() {
        let mut ep = episode("ep_1");
        ep.status = "draft".to_string();
        ep.episode_type = EpisodeType::Trailer;

        let payload = UpdatePayload::baseline(&ep);
        assert_eq!(payload.status, "draft");
        assert_eq!(payload.episode_type, EpisodeType::Trailer);
        assert_eq!(payload.title, None);
        assert_eq!(payload.season_no, None);
    }

    #[test]
    fn test_payload_to_form_boolean_coercion() {
        let ep = episode("ep_1");
        let mut payload = UpdatePayload::baseline(&ep);
        payload.content_explicit = Some(true);

        let form = payload.to_form();
        assert!(form.contains(&("content_explicit", "true".to_string())));

        payload.content_explicit = Some(false);
        let form = payload.to_form();
        assert!(form.contains(&("content_explicit", "false".to_string())));
    }

    #[test]
    fn test_payload_to_form_omits_unset_fields() {
        let ep = episode("ep_1");
        let payload = UpdatePayload::baseline(&ep);

        let form = payload.to_form();
        let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["status", "episode_type"]);
    }

    #[test]
    fn test_payload_to_form_includes_edits() {
        let ep = episode("ep_1");
        let mut payload = UpdatePayload::baseline(&ep);
        payload.title = Some("New Title".to_string());
        payload.season_no = Some(3);

        let form = payload.to_form();
        assert!(form.contains(&("title", "New Title".to_string())));
        assert!(form.contains(&("season_no", "3".to_string())));
    }

    #[test]
    fn test_strip_html_tags_and_entities() {
        assert_eq!(strip_html("<p>One&nbsp;&amp;\n<b>two</b></p>"), "One & two");
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html(""), "");
    }
}
