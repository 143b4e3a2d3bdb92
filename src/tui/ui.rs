use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use crate::commands::describe_dates;
use crate::models::Task;
use crate::storage::KeyValueStore;
use crate::swipe::Clock;
use super::app::{App, InputMode};

const HIGHLIGHT_SYMBOL: &str = ">> ";
const NORMAL_HELP: &str = concat!(
    "q: Quit | a: Add | Space: Done | ←/→: Swipe | ",
    "Enter: Delete (open row) | d: Del | J/K: Move",
);

pub fn ui<S: KeyValueStore, C: Clock + Clone + 'static>(f: &mut Frame, app: &mut App<S, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Task rows
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    let title = format!("swipedo - Tasks ({})", app.controller.len());
    let block = Block::default().borders(Borders::ALL).title(title);
    let list_area = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);
    app.list_area = list_area;
    app.ensure_visible(list_area.height as usize);

    if app.controller.is_empty() {
        let empty = Paragraph::new("No tasks yet. Press 'a' to add one.")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, list_area);
    }

    let visible = app
        .controller
        .tasks()
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(list_area.height as usize);
    for (line, (index, task)) in visible.enumerate() {
        let area = Rect::new(list_area.x, list_area.y + line as u16, list_area.width, 1);
        let selected = app.selected == Some(index);
        let Some(row) = app.row(&task.id) else { continue };

        let mut style = Style::default();
        if task.is_completed {
            style = style.fg(Color::DarkGray);
        }
        if selected {
            style = style.add_modifier(Modifier::BOLD).bg(Color::DarkGray);
            if task.is_completed {
                style = style.fg(Color::Gray);
            }
        }

        let view = row
            .view(task_line(task, selected, area.width), || Line::from(" Delete"))
            .style(style)
            .actions_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(view, area);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => NORMAL_HELP,
        InputMode::Adding => "Enter: Save | Esc: Cancel",
    };
    let help = match &app.status {
        Some(status) => Paragraph::new(status.as_str()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(help_text).style(Style::default().fg(Color::Gray)),
    };
    f.render_widget(help.block(Block::default().borders(Borders::ALL)), chunks[1]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Add Task"));
        f.render_widget(input, area);
    }
}

/// Checkbox, title and dates of one task, with the dates pushed to the right
/// edge when they fit.
fn task_line(task: &Task, selected: bool, width: u16) -> Line<'static> {
    let marker = if selected { HIGHLIGHT_SYMBOL } else { "   " };
    let checkbox = if task.is_completed { "[x] " } else { "[ ] " };
    let title = if task.is_completed {
        Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::CROSSED_OUT))
    } else {
        Span::raw(task.title.clone())
    };
    let dates = Span::styled(describe_dates(task), Style::default().add_modifier(Modifier::DIM));

    let used = marker.len() + checkbox.len() + title.width() + dates.width();
    let gap = (width as usize).saturating_sub(used).max(2);
    Line::from(vec![
        Span::raw(marker),
        Span::raw(checkbox),
        title,
        Span::raw(" ".repeat(gap)),
        dates,
    ])
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
