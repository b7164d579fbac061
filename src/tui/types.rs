//! TUI type definitions for screens, table columns, and actions.

use crate::tracker::EditableField;
use ratatui::layout::Constraint;

/// The current screen/view of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Waiting for a fetch to finish
    Loading,
    /// The episode table editor
    Table,
}

/// Actions that can be returned from the TUI.
///
/// Only operations that need the network bubble up to the event loop;
/// local edits are applied directly to the session by the input handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Re-fetch the episode list, discarding pending edits
    Refresh,
    /// Save every dirty episode, then re-fetch
    SaveAll,
}

/// One column of the episode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Author,
    SeasonNo,
    EpisodeNo,
    EpisodeType,
    ContentExplicit,
    Summary,
    Content,
    Status,
}

impl Column {
    /// All columns, in display order.
    pub const ALL: [Column; 9] = [
        Column::Title,
        Column::Author,
        Column::SeasonNo,
        Column::EpisodeNo,
        Column::EpisodeType,
        Column::ContentExplicit,
        Column::Summary,
        Column::Content,
        Column::Status,
    ];

    /// Column header label.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Author => "Author",
            Column::SeasonNo => "S#",
            Column::EpisodeNo => "E#",
            Column::EpisodeType => "Type",
            Column::ContentExplicit => "Explicit",
            Column::Summary => "Summary",
            Column::Content => "Content",
            Column::Status => "Status",
        }
    }

    /// The editable field behind this column, or `None` for read-only
    /// columns (`status` is server-controlled).
    pub fn field(&self) -> Option<EditableField> {
        match self {
            Column::Title => Some(EditableField::Title),
            Column::Author => Some(EditableField::Author),
            Column::SeasonNo => Some(EditableField::SeasonNo),
            Column::EpisodeNo => Some(EditableField::EpisodeNo),
            Column::EpisodeType => Some(EditableField::EpisodeType),
            Column::ContentExplicit => Some(EditableField::ContentExplicit),
            Column::Summary => Some(EditableField::Summary),
            Column::Content => Some(EditableField::Content),
            Column::Status => None,
        }
    }

    /// Layout constraint for this column.
    pub fn width(&self) -> Constraint {
        match self {
            Column::Title => Constraint::Min(20),
            Column::Author => Constraint::Length(12),
            Column::SeasonNo => Constraint::Length(4),
            Column::EpisodeNo => Constraint::Length(4),
            Column::EpisodeType => Constraint::Length(7),
            Column::ContentExplicit => Constraint::Length(8),
            Column::Summary => Constraint::Length(24),
            Column::Content => Constraint::Length(24),
            Column::Status => Constraint::Length(8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_column_is_read_only() {
        assert_eq!(Column::Status.field(), None);
        for col in Column::ALL {
            if col != Column::Status {
                assert!(col.field().is_some(), "{:?} should be editable", col);
            }
        }
    }

    #[test]
    fn test_column_order_starts_with_title() {
        assert_eq!(Column::ALL[0], Column::Title);
        assert_eq!(Column::ALL.len(), 9);
    }
}
