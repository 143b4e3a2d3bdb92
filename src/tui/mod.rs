pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::controller::TaskController;
use crate::storage::KeyValueStore;
use crate::swipe::{Clock, SystemClock};
use app::{App, InputMode};
use ui::ui;

/// Redraw interval while a row is moving.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Poll interval while nothing moves.
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

pub fn run_tui<S: KeyValueStore>(controller: TaskController<S>) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, SystemClock::new());
    info!("event=tui_start module=tui status=ok tasks={}", app.controller.len());

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("event=tui_exit module=tui status=error error={}", err);
        println!("{:?}", err)
    } else {
        info!("event=tui_exit module=tui status=ok");
    }

    Ok(())
}

fn run_app<B: Backend, S: KeyValueStore, C: Clock + Clone + 'static>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = if app.is_animating() { FRAME_INTERVAL } else { IDLE_INTERVAL };
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if !handle_key(app, key) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) if app.input_mode == InputMode::Normal => app.handle_mouse(mouse),
            _ => {}
        }
    }
}

/// Applies one key press. Returns `false` when the app should quit.
fn handle_key<S: KeyValueStore, C: Clock + Clone + 'static>(
    app: &mut App<S, C>,
    key: KeyEvent,
) -> bool {
    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Down if key.modifiers.contains(KeyModifiers::SHIFT) => app.move_selected(1),
            KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => app.move_selected(-1),
            KeyCode::Char('J') => app.move_selected(1),
            KeyCode::Char('K') => app.move_selected(-1),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Left => app.open_selected(),
            KeyCode::Right | KeyCode::Esc => app.close_selected(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Enter => app.activate_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('a') => app.start_add(),
            _ => {}
        },
        InputMode::Adding => match key.code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => {
                app.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::swipe::ManualClock;

    fn press(
        app: &mut App<MemoryStore, ManualClock>,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> bool {
        handle_key(app, KeyEvent::new(code, modifiers))
    }

    #[test]
    fn typing_a_title_adds_a_task() {
        let controller = TaskController::new(MemoryStore::new(), "TODO_TASKS");
        let mut app = App::new(controller, ManualClock::new());
        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        for c in "Buy milk".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('k'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.controller.tasks()[0].title, "Buy milk");
        assert!(!press(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
    }

    #[test]
    fn arrow_keys_swipe_the_selected_row() {
        let mut controller = TaskController::new(MemoryStore::new(), "TODO_TASKS");
        controller.add("A");
        let mut app = App::new(controller, ManualClock::new());
        let id = app.selected_id().unwrap();
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert!(app.row(&id).unwrap().state().is_open());
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert!(!app.row(&id).unwrap().state().is_open());
        press(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(app.controller.tasks()[0].is_completed);
    }
}
