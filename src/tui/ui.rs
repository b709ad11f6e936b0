use super::app::TuiApp;
use super::state::{BannerKind, Mode, View};
use crate::app::config::FieldValue;
use crate::app::fields::{FieldKey, FieldKind, GROUPS, GroupKey, fields_in_group, group_summary};
use crate::app::validation::{Severity, Validation};
use crate::download::args::{Invocation, TokenRole, is_launchable, quote_for_display};
use crate::download::history::RunStatus;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Main rendering function
pub fn render(app: &TuiApp, f: &mut Frame) {
    let size = f.area();

    // header, key hints, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(app, f, chunks[0]);
    render_key_hints(app, f, chunks[1]);

    match app.state.view {
        View::History => render_history(app, f, chunks[2]),
        View::Groups => render_groups(app, f, chunks[2]),
        View::Fields => render_fields(app, f, chunks[2]),
    }

    render_status_bar(app, f, chunks[3]);

    // Overlays
    match app.state.mode {
        Mode::Prompt => render_prompt_dialog(app, f, size),
        Mode::InlineEdit => render_inline_editor(app, f, size),
        Mode::FileBrowser => render_file_browser(app, f, size),
        Mode::Confirm => render_confirm_dialog(app, f, size),
        Mode::Preview => render_preview(app, f, size),
        Mode::List => {}
    }
}

fn render_header(app: &TuiApp, f: &mut Frame, area: Rect) {
    let title = match (app.state.view, app.state.current_group) {
        (View::History, _) => "ARIA2TUI - Download history".to_string(),
        (View::Groups, _) => "ARIA2TUI - Setup".to_string(),
        (View::Fields, Some(group)) => {
            let group = group.group();
            format!("ARIA2TUI - {} {}", group.icon, group.name)
        }
        (View::Fields, None) => "ARIA2TUI".to_string(),
    };

    let header = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    f.render_widget(header, area);
}

fn render_key_hints(app: &TuiApp, f: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = match app.state.view {
        View::History => &[
            ("Up/Down", "select"),
            ("Enter", "restore"),
            ("n", "new"),
            ("d", "delete"),
            ("q", "quit"),
        ],
        View::Groups => &[
            ("Up/Down", "select"),
            ("Enter", "open"),
            ("u", "URIs"),
            ("t", "torrent"),
            ("p", "preview"),
            ("r", "run"),
            ("s", "save"),
            ("Esc", "history"),
            ("q", "quit"),
        ],
        View::Fields => &[
            ("Up/Down", "select"),
            ("Enter", "edit"),
            ("Space", "toggle"),
            ("Esc", "back"),
            ("p", "preview"),
            ("s", "save"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, Style::default().fg(Color::Green)));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_history(app: &TuiApp, f: &mut Frame, area: Rect) {
    let entries = app.app.history.entries();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let name_width = (area.width as usize).saturating_sub(36).max(10);

    let mut items = vec![ListItem::new(Line::from(Span::styled(
        "+ New download",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )))];

    for entry in entries {
        let (icon, color) = status_style(entry.status);
        let time = entry
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%m/%d %H:%M")
            .to_string();
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("{icon} "), Style::default().fg(color)),
            Span::raw(format!("{:<width$}", truncate_display(&entry.filename, name_width), width = name_width)),
            Span::styled(format!("  {time}"), Style::default().fg(Color::DarkGray)),
        ])));
    }

    if entries.is_empty() {
        items.push(ListItem::new(""));
        items.push(ListItem::new(Span::styled(
            "No downloads yet. Press n to start one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(app.state.selected));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    // Footer: what Enter does on the selected row
    let max_width = chunks[1].width as usize;
    let footer = match app.state.selected.checked_sub(1).and_then(|i| app.app.history.get(i)) {
        None => vec![Line::from(Span::styled(
            "Start a new download",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(entry) => {
            let (hint, color) = match entry.status {
                RunStatus::Completed => ("Already downloaded, Enter downloads it again", Color::Yellow),
                RunStatus::Failed => ("Enter loads the settings to retry", Color::Cyan),
                RunStatus::Pending => ("Enter loads the settings to resume", Color::Cyan),
            };
            vec![
                Line::from(Span::styled(
                    truncate_display(&entry.source, max_width),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(hint, Style::default().fg(color))),
            ]
        }
    };
    f.render_widget(
        Paragraph::new(footer).block(Block::default().borders(Borders::TOP)),
        chunks[1],
    );
}

fn status_style(status: RunStatus) -> (&'static str, Color) {
    match status {
        RunStatus::Completed => ("✓", Color::Green),
        RunStatus::Failed => ("✗", Color::Red),
        RunStatus::Pending => ("…", Color::Yellow),
    }
}

fn render_groups(app: &TuiApp, f: &mut Frame, area: Rect) {
    let ready = app.state.input_ready;

    let items: Vec<ListItem> = GROUPS
        .iter()
        .map(|group| {
            let locked = !group.required && !ready;
            let (marker, marker_color) = match group.key {
                GroupKey::Input if ready => ("✓", Color::Green),
                GroupKey::Input => ("!", Color::Yellow),
                _ if locked => ("-", Color::DarkGray),
                GroupKey::Action => ("▶", Color::Green),
                _ => ("▸", Color::Cyan),
            };
            let name_style = if locked {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            let mut spans = vec![
                Span::styled(format!("{marker} "), Style::default().fg(marker_color)),
                Span::styled(format!("{:<14}", group.name), name_style),
                Span::styled(group.description, Style::default().fg(Color::DarkGray)),
            ];
            if group.key != GroupKey::Action {
                let (set, total) = group_summary(&app.app.config, group.key);
                spans.push(Span::styled(
                    format!("  [{set}/{total}]"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if locked {
                spans.push(Span::styled(
                    "  (locked)",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(app.state.selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_fields(app: &TuiApp, f: &mut Frame, area: Rect) {
    let Some(group) = app.state.current_group else {
        return;
    };
    let fields = fields_in_group(group);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let label_width = fields.iter().map(|f| f.label.width()).max().unwrap_or(0) + 2;
    let value_width = (chunks[0].width as usize).saturating_sub(label_width + 4).max(8);

    let selected_key = app.selected_field().map(|f| f.key);

    let items: Vec<ListItem> = fields
        .iter()
        .map(|field| {
            let value = app.app.config.get(field.key);
            let value_span = match (field.kind, value) {
                (FieldKind::Action, _) => Span::styled(
                    "start aria2c",
                    Style::default().fg(Color::Green),
                ),
                (_, Some(FieldValue::Bool(b))) => Span::styled(
                    if b { "[x]" } else { "[ ]" },
                    Style::default().fg(Color::Cyan),
                ),
                (FieldKind::Enum(_), Some(value)) => Span::styled(
                    format!("< {} >", value.display()),
                    Style::default().fg(Color::Cyan),
                ),
                (_, Some(value)) if value.is_set() => Span::raw(truncate_display(
                    &value.display(),
                    value_width,
                )),
                _ => Span::styled("(empty)", Style::default().fg(Color::DarkGray)),
            };

            let (glyph, glyph_color) = kind_glyph(field.kind, &app.app.config.get(field.key));
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{glyph} "), Style::default().fg(glyph_color)),
                Span::raw(format!("{:<width$}", field.label, width = label_width)),
                value_span,
            ])];

            // URI list under the selected URI field
            if field.key == FieldKey::Uris && selected_key == Some(FieldKey::Uris) {
                for uri in &app.app.config.uris {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", truncate_display(uri, value_width + label_width)),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(app.state.selected));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    if let Some(field) = app.selected_field() {
        let details = Paragraph::new(field.description)
            .block(Block::default().borders(Borders::TOP))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        f.render_widget(details, chunks[1]);
    }
}

fn kind_glyph(kind: FieldKind, value: &Option<FieldValue>) -> (&'static str, Color) {
    match (kind, value) {
        (FieldKind::Bool, Some(FieldValue::Bool(true))) => ("✓", Color::Green),
        (FieldKind::Bool, _) => ("✗", Color::Red),
        (FieldKind::Action, _) => ("▶", Color::Green),
        (FieldKind::List, _) => ("≡", Color::Cyan),
        (FieldKind::Number, _) => ("#", Color::Cyan),
        (FieldKind::Enum(_), _) => ("⚙", Color::Cyan),
        (FieldKind::File, _) => ("@", Color::Cyan),
        (FieldKind::Text, _) => ("▸", Color::DarkGray),
    }
}

fn render_status_bar(app: &TuiApp, f: &mut Frame, area: Rect) {
    let (left_content, left_style) = match &app.state.banner {
        Some(banner) => {
            let (icon, color) = match banner.kind {
                BannerKind::Info => ("i", Color::Cyan),
                BannerKind::Success => ("✓", Color::Green),
                BannerKind::Warning => ("!", Color::Yellow),
                BannerKind::Error => ("✗", Color::Red),
            };
            (format!("{icon} {}", banner.text), Style::default().fg(color))
        }
        None => (String::new(), Style::default()),
    };
    let right_content = app.app.paths.bin.clone();

    // Create a single line without border
    let padding_width = area.width.saturating_sub(
        (left_content.width() + right_content.width() + 2) as u16,
    );

    let status_line = Line::from(vec![
        Span::styled(left_content, left_style),
        Span::raw(" ".repeat(padding_width as usize)),
        Span::styled(right_content, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(status_line), area);
}

/// Centered rectangle, clamped to `area`
fn dialog_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

/// Text input box; places the terminal cursor after the buffer
fn render_input_box(f: &mut Frame, area: Rect, title: &str, buffer: &str) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = tail_display(buffer, inner_width.saturating_sub(1));
    let paragraph = Paragraph::new(visible.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
    f.set_cursor_position((area.x + 1 + visible.width() as u16, area.y + 1));
}

fn validation_line(validation: &Validation) -> Option<Line<'static>> {
    let message = validation.message.clone()?;
    let (icon, color) = match validation.severity {
        Severity::Invalid => ("✗", Color::Red),
        Severity::Warning => ("!", Color::Yellow),
        Severity::Info | Severity::Ok => ("✓", Color::Green),
    };
    Some(Line::from(Span::styled(
        format!("{icon} {message}"),
        Style::default().fg(color),
    )))
}

fn render_prompt_dialog(app: &TuiApp, f: &mut Frame, area: Rect) {
    let Some(prompt) = &app.state.prompt else {
        return;
    };
    let dialog_area = dialog_rect(area, 70, 7);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(dialog_area);

    let mut lines = Vec::new();
    if !prompt.hint.is_empty() {
        lines.push(Line::from(Span::styled(
            prompt.hint.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(line) = validation_line(&prompt.validation) {
        lines.push(line);
    }
    lines.push(Line::from(Span::styled(
        "Enter confirm  Esc cancel",
        Style::default().fg(Color::Cyan),
    )));

    let footer = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, chunks[1]);
    f.render_widget(footer, chunks[1]);

    render_input_box(f, chunks[0], &prompt.label, &prompt.buffer);
}

fn render_inline_editor(app: &TuiApp, f: &mut Frame, area: Rect) {
    let Some(edit) = &app.state.inline_edit else {
        return;
    };
    let dialog_area = dialog_rect(area, area.width.saturating_sub(4), 5);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(dialog_area);

    let count = edit.buffer.split_whitespace().count();
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{count} URI(s)  "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "space separates URIs  Enter confirm  Esc cancel",
            Style::default().fg(Color::Cyan),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(Clear, chunks[1]);
    f.render_widget(footer, chunks[1]);

    render_input_box(f, chunks[0], edit.target.field().label, &edit.buffer);
}

fn render_file_browser(app: &TuiApp, f: &mut Frame, area: Rect) {
    let Some(browser) = &app.state.file_browser else {
        return;
    };
    let dialog_area = dialog_rect(area, 80, area.height.saturating_sub(4).max(8));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Select input file ")
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, dialog_area);
    f.render_widget(block, dialog_area);

    let inner = |r: Rect| Rect {
        x: r.x + 1,
        width: r.width.saturating_sub(2),
        ..r
    };

    let max_width = chunks[0].width.saturating_sub(2) as usize;
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            truncate_display(&browser.directory.display().to_string(), max_width),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Up/Down select  Enter confirm  Esc cancel",
            Style::default().fg(Color::Cyan),
        )),
    ]);
    f.render_widget(
        header,
        Rect {
            y: chunks[0].y + 1,
            height: chunks[0].height.min(dialog_area.height.saturating_sub(2)),
            ..inner(chunks[0])
        },
    );

    let list_area = Rect {
        height: chunks[1].height.saturating_sub(2),
        y: chunks[1].y + 1,
        ..inner(chunks[1])
    };

    if browser.entries.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No .torrent, .metalink, .meta4 or .txt files here",
            Style::default().fg(Color::Yellow),
        ));
        f.render_widget(empty, list_area);
        return;
    }

    let items: Vec<ListItem> = browser
        .entries
        .iter()
        .map(|entry| ListItem::new(truncate_display(&entry.name, max_width.saturating_sub(2))))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(browser.selected));
    f.render_stateful_widget(list, list_area, &mut list_state);
}

fn render_confirm_dialog(app: &TuiApp, f: &mut Frame, area: Rect) {
    let Some(action) = app.state.pending_action else {
        return;
    };
    let dialog_area = dialog_rect(area, 60, 7);

    let lines = vec![
        Line::from(Span::styled(
            action.question(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[ Yes (Y) ]", Style::default().fg(Color::Green)),
            Span::raw("       "),
            Span::styled("[ No (N) ]", Style::default().fg(Color::Red)),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, dialog_area);
    f.render_widget(paragraph, dialog_area);
}

/// Full-screen command preview, flags in cyan and values in white
fn render_preview(app: &TuiApp, f: &mut Frame, area: Rect) {
    let invocation = Invocation::from_config(&app.app.config);

    let mut command = vec![Span::styled(
        quote_for_display(&app.app.paths.bin),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];
    for token in invocation.tokens() {
        let color = match token.role {
            TokenRole::Flag => Color::Cyan,
            TokenRole::Value => Color::White,
            TokenRole::Positional => Color::Green,
        };
        command.push(Span::raw(" "));
        command.push(Span::styled(
            quote_for_display(&token.text),
            Style::default().fg(color),
        ));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Enter/r run  Esc back  q quit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(command),
    ];
    if !is_launchable(&app.app.config) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "! No input source: nothing to download yet",
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Command preview ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: false });

    let preview_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    f.render_widget(Clear, preview_area);
    f.render_widget(paragraph, preview_area);
}

/// Truncate to a display width, keeping a short extension when possible
fn truncate_display(text: &str, max_width: usize) -> String {
    // Use display width (accounts for East Asian characters = 2 cells)
    if text.width() <= max_width {
        return text.to_string();
    }

    if let Some(dot_pos) = text.rfind('.') {
        let (name, ext) = text.split_at(dot_pos);
        let ext_width = ext.width();
        if ext_width < 10 && ext_width + 3 < max_width {
            let head = take_width(name, max_width - ext_width - 3);
            return format!("{head}...{ext}");
        }
    }

    format!("{}...", take_width(text, max_width.saturating_sub(3)))
}

fn take_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

/// Rightmost part of `text` that fits in `max_width`, for scrolling inputs
fn tail_display(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let ch_width = ch.width().unwrap_or(1);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        start = idx;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_display_short() {
        assert_eq!(truncate_display("file.iso", 20), "file.iso");
    }

    #[test]
    fn test_truncate_display_keeps_extension() {
        let result = truncate_display("very_long_file_name_for_testing.torrent", 20);
        assert!(result.ends_with("....torrent"));
        assert!(result.width() <= 20);
    }

    #[test]
    fn test_truncate_display_wide_chars() {
        let result = truncate_display("日本語のファイル名前です", 10);
        assert!(result.width() <= 10);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_tail_display() {
        assert_eq!(tail_display("abcdef", 3), "def");
        assert_eq!(tail_display("abc", 10), "abc");
        assert_eq!(tail_display("", 5), "");
    }

    #[test]
    fn test_dialog_rect_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = dialog_rect(area, 60, 7);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 1);
    }
}
