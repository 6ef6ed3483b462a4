use crate::app::{App, InputMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use veil_page::EditableSurface;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    draw_main(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let title = Paragraph::new("veil - Redaction Rules & Compose Preview")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn draw_main(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Rule list
            Constraint::Percentage(55), // Compose / preview
        ])
        .split(area);

    draw_rule_list(f, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    draw_compose(f, app, right[0]);
    draw_preview(f, app, right[1]);
}

fn draw_rule_list(f: &mut Frame, app: &App, area: Rect) {
    let mut items: Vec<ListItem> = Vec::new();

    for (i, rule) in app.rules.iter().enumerate() {
        let marker = if rule.enabled { "●" } else { "○" };
        let line = format!(
            "{} {:?} → {:?}  ({}, p{})",
            marker, rule.match_text, rule.replacement, rule.kind, rule.priority
        );

        let style = if i == app.selected_rule {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if !rule.enabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        items.push(ListItem::new(line).style(style));
    }

    let title = match app.input_mode {
        InputMode::AddingRule => format!(" Rules - new: {}_ ", app.input_buffer),
        InputMode::ConfirmDelete => " Rules - delete? (y/n) ".to_string(),
        _ => format!(" Rules ({}) ", app.rules.len()),
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn draw_compose(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.input_mode == InputMode::Composing {
        " Compose [EDITING] "
    } else {
        " Compose "
    };

    let content = if app.input_mode == InputMode::Composing {
        with_caret(app.compose.value(), app.compose.selection().0)
    } else if app.compose.value().is_empty() {
        "Press i to compose. Typing and pasting run through the live rules.".to_string()
    } else {
        app.compose.value().to_string()
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let restored = app.restored();
    let content = if restored == app.compose.value() {
        "Nothing to restore.".to_string()
    } else {
        restored
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Restored (y to copy) "))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

/// Insert a visible caret marker at the char offset.
fn with_caret(value: &str, caret: usize) -> String {
    let mut out: String = value.chars().take(caret).collect();
    out.push('▏');
    out.extend(value.chars().skip(caret));
    out
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        "Ready".to_string()
    };

    let hints = match app.input_mode {
        InputMode::Composing => vec![
            Span::raw(status),
            Span::raw(" | "),
            Span::styled("esc", Style::default().fg(Color::Yellow)),
            Span::raw(":done "),
            Span::styled("paste", Style::default().fg(Color::Yellow)),
            Span::raw(":intercepted"),
        ],
        _ => vec![
            Span::raw(status),
            Span::raw(" | "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(":quit "),
            Span::styled("j/k", Style::default().fg(Color::Yellow)),
            Span::raw(":move "),
            Span::styled("space", Style::default().fg(Color::Yellow)),
            Span::raw(":toggle "),
            Span::styled("a", Style::default().fg(Color::Yellow)),
            Span::raw(":add "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(":delete "),
            Span::styled("i", Style::default().fg(Color::Yellow)),
            Span::raw(":compose "),
            Span::styled("y", Style::default().fg(Color::Yellow)),
            Span::raw(":copy"),
        ],
    };

    let footer = Paragraph::new(Line::from(hints)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
