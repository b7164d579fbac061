//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::session::RowStatus;
use crate::types::strip_html;

use super::state::App;
use super::types::{Column, Screen};

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let show_filter = app.filter_active || !app.filter.is_empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // Header
            Constraint::Length(if show_filter { 3 } else { 0 }), // Filter
            Constraint::Min(0),                                 // Episode table
            Constraint::Length(7),                              // Detail pane
            Constraint::Length(3),                              // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);

    if show_filter {
        draw_filter(frame, app, chunks[1]);
    }

    match app.screen {
        Screen::Loading => draw_loading(frame, app, chunks[2]),
        Screen::Table => draw_table(frame, app, chunks[2]),
    }

    draw_detail(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);

    if let Some(error) = &app.error_message {
        draw_error_popup(frame, error);
    }

    if app.edit_mode {
        draw_edit_popup(frame, app);
    }

    if app.save_confirm_mode {
        draw_save_confirm_popup(frame, app);
    }

    if app.refresh_confirm_mode {
        draw_refresh_confirm_popup(frame, app);
    }

    if app.show_save_modal {
        draw_save_modal(frame, app);
    }

    if app.show_help {
        draw_help_modal(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let dirty = app.session.dirty_count();
    let dirty_style = if dirty > 0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "podbean-editor",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{} episodes]", app.session.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(format!("[{} unsaved]", dirty), dirty_style),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_filter(frame: &mut Frame, app: &App, area: Rect) {
    let filter_style = if app.filter_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_title = if app.filter.is_empty() {
        "Filter (type to search)".to_string()
    } else {
        format!("Filter ({} matches)", app.get_filtered_indices().len())
    };

    let filter_input = Paragraph::new(app.filter.as_str())
        .style(filter_style)
        .block(Block::default().borders(Borders::ALL).title(filter_title));

    frame.render_widget(filter_input, area);

    if app.filter_active {
        frame.set_cursor_position((area.x + app.filter.len() as u16 + 1, area.y + 1));
    }
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect) {
    let loading = Paragraph::new(app.loading_message.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Loading"));

    frame.render_widget(loading, area);
}

/// Maximum characters shown per cell, by column.
fn cell_budget(column: Column) -> usize {
    match column {
        Column::Title => 40,
        Column::Author => 12,
        Column::SeasonNo | Column::EpisodeNo => 4,
        Column::EpisodeType | Column::ContentExplicit | Column::Status => 8,
        Column::Summary | Column::Content => 24,
    }
}

/// Truncate by characters, not bytes, to avoid UTF-8 boundary panics.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}…", text.chars().take(max.saturating_sub(1)).collect::<String>())
    } else {
        text.to_string()
    }
}

fn status_style(status: RowStatus) -> Style {
    match status {
        RowStatus::Clean => Style::default().fg(Color::DarkGray),
        RowStatus::Dirty => Style::default().fg(Color::Yellow),
        RowStatus::Saving => Style::default().fg(Color::Cyan),
        RowStatus::Saved => Style::default().fg(Color::Green),
        RowStatus::Failed => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn draw_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let filtered = app.get_filtered_indices();
    let selected_row = app.table_state.selected();
    let selected_column = app.selected_column;

    // Header row: status marker column plus the editable columns, with the
    // selected column highlighted.
    let mut header_cells = vec![Cell::from(" ")];
    for (i, col) in Column::ALL.iter().enumerate() {
        let style = if i == selected_column {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        header_cells.push(Cell::from(col.header()).style(style));
    }
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = filtered
        .iter()
        .enumerate()
        .map(|(pos, &idx)| {
            let episode = &app.session.episodes()[idx];
            let status = app.session.status(&episode.id);

            let mut cells =
                vec![Cell::from(status.marker()).style(status_style(status))];

            for (col_idx, col) in Column::ALL.iter().enumerate() {
                let raw = match col.field() {
                    Some(field) => app
                        .session
                        .current_value(&episode.id, field)
                        .unwrap_or_default(),
                    None => episode.status.clone(),
                };

                let text = match col {
                    Column::Summary | Column::Content => {
                        truncate(&strip_html(&raw), cell_budget(*col))
                    }
                    _ => truncate(&raw, cell_budget(*col)),
                };

                let edited = col
                    .field()
                    .map(|f| {
                        app.session.current_value(&episode.id, f)
                            != Some(f.baseline_of(episode))
                    })
                    .unwrap_or(false);

                let mut style = if edited {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                if Some(pos) == selected_row && col_idx == selected_column {
                    style = style.add_modifier(Modifier::REVERSED);
                }

                cells.push(Cell::from(text).style(style));
            }

            Row::new(cells).height(1)
        })
        .collect();

    let mut widths = vec![Constraint::Length(1)];
    widths.extend(Column::ALL.iter().map(|c| c.width()));

    let title = if app.filter.is_empty() {
        "Episodes".to_string()
    } else {
        "Episodes (filtered)".to_string()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ")
        .column_spacing(1);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let detail = match app
        .selected_episode_id()
        .and_then(|id| app.session.episode(&id).cloned())
    {
        Some(episode) => {
            let status = app.session.status(&episode.id);
            let label = episode.number_label().unwrap_or_default();
            format!(
                "{}  {}  [{}]  type {}  explicit {}  status {}\nAuthor: {}\n{}",
                episode.id,
                episode.title,
                label,
                episode.episode_type.as_str(),
                episode.content_explicit,
                episode.status,
                episode.author,
                truncate(&strip_html(&episode.summary), 300),
            ) + match status {
                RowStatus::Failed => "\nLast save failed. Re-edit and save again.",
                _ => "",
            }
        }
        None => "No episode selected".to_string(),
    };

    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(detail_widget, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(status) = &app.status_message {
        (status.clone(), Style::default().fg(Color::Green))
    } else {
        let hints = if app.edit_mode {
            "[Enter] apply  [Esc] cancel".to_string()
        } else if app.filter_active {
            "[Enter] confirm  [Esc] done".to_string()
        } else {
            match app.screen {
                Screen::Loading => "[q] quit".to_string(),
                Screen::Table => format!(
                    "[↑↓] rows  [←→] columns  [Enter] edit  [/] filter  [s] save ({})  [r] refresh  [?] help  [q] quit",
                    app.session.dirty_count()
                ),
            }
        };
        (hints, Style::default().fg(Color::DarkGray))
    };

    let footer = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(format!("{}\n\nPress any key to dismiss", error))
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_edit_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 15, frame.area());
    frame.render_widget(Clear, area);

    let column = app.selected_col();
    let hint = if column.field().map(|f| f.is_numeric()).unwrap_or(false) {
        " (digits only, blank to clear)"
    } else {
        ""
    };

    let popup = Paragraph::new(app.edit_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Edit {}{}", column.header(), hint))
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(popup, area);
    frame.set_cursor_position((area.x + app.edit_input.chars().count() as u16 + 1, area.y + 1));
}

fn draw_save_confirm_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let count = app.session.dirty_count();
    let message = format!(
        "Save {} episode{}?\n\n[Y/Enter] Yes  [N/Esc] No",
        count,
        if count == 1 { "" } else { "s" }
    );

    let popup = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Save")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_refresh_confirm_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let count = app.session.dirty_count();
    let message = format!(
        "Discard {} unsaved edit{} and re-fetch?\n\n[Y/Enter] Yes  [N/Esc] No",
        count,
        if count == 1 { "" } else { "s" }
    );

    let popup = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Discard Edits")
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_save_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Saving episode {} of {}", app.save_current, app.save_total),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(app.save_message.as_str()),
        Line::from(""),
    ];
    for entry in &app.save_log {
        lines.push(Line::from(Span::styled(
            entry.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Saving")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(popup, area);
}

fn draw_help_modal(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let content = "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  q           Quit

Navigation
──────────
  j / ↓       Move down a row
  k / ↑       Move up a row
  h / ←       Previous column
  l / → / Tab Next column

Editing
───────
  Enter / e   Edit the selected cell
              (Type cycles full/trailer/bonus,
               Explicit toggles true/false)
  Esc         Cancel an edit or clear the filter
  /           Filter by title or id

Saving
──────
  s           Save all edited episodes, then re-fetch
  r           Re-fetch, discarding unsaved edits

Rows marked * have unsaved edits; rows marked ! failed
their last save and need re-editing.

Press ? to close";

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
