use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use log::{debug, info};
use ratatui::layout::Rect;

use crate::controller::TaskController;
use crate::storage::KeyValueStore;
use crate::swipe::{
    columns_to_units, units_to_columns, Clock, PointerEvent, SwipeConfig, SwipeEvent, SwipeRow,
    TimedAnimator, UNITS_PER_COLUMN,
};

/// Vertical units covered by one terminal line. One line of travel is
/// enough to hand a press over to list scrolling.
pub const UNITS_PER_LINE: f32 = 2.0 * UNITS_PER_COLUMN;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Adding,
}

/// The row a pointer press landed on.
#[derive(Debug, Clone, PartialEq)]
struct Press {
    task_id: String,
    /// The press began on the revealed action area of an open row.
    on_action: bool,
}

type SwipeQueue = Rc<RefCell<VecDeque<(String, SwipeEvent)>>>;

pub struct App<S: KeyValueStore, C: Clock + Clone> {
    pub controller: TaskController<S>,
    pub rows: HashMap<String, SwipeRow<TimedAnimator<C>>>,
    pub selected: Option<usize>,
    pub scroll_offset: usize,
    pub input_mode: InputMode,
    pub input_buffer: String,
    /// Where the task rows were last drawn, for mouse hit testing.
    pub list_area: Rect,
    pub status: Option<String>,
    swipe_config: SwipeConfig,
    swipe_events: SwipeQueue,
    press: Option<Press>,
    clock: C,
}

impl<S: KeyValueStore, C: Clock + Clone + 'static> App<S, C> {
    /// Creates the app around a loaded controller.
    pub fn new(controller: TaskController<S>, clock: C) -> App<S, C> {
        let mut app = App {
            controller,
            rows: HashMap::new(),
            selected: None,
            scroll_offset: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            list_area: Rect::default(),
            status: None,
            swipe_config: SwipeConfig::default(),
            swipe_events: Rc::new(RefCell::new(VecDeque::new())),
            press: None,
            clock,
        };
        app.sync();
        app
    }

    /// Brings swipe rows and the selection in line with the task list.
    fn sync(&mut self) {
        let ids: Vec<String> = self.controller.tasks().iter().map(|t| t.id.clone()).collect();
        self.rows.retain(|id, _| ids.contains(id));
        for id in ids {
            if !self.rows.contains_key(&id) {
                let row = self.make_row(&id);
                self.rows.insert(id, row);
            }
        }

        let len = self.controller.len();
        self.selected = match self.selected {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        if self.controller.last_save_ok() {
            if self.status.as_deref() == Some(SAVE_FAILED) {
                self.status = None;
            }
        } else {
            self.status = Some(SAVE_FAILED.to_string());
        }
    }

    fn make_row(&self, id: &str) -> SwipeRow<TimedAnimator<C>> {
        let opened = (Rc::clone(&self.swipe_events), id.to_string());
        let closed = (Rc::clone(&self.swipe_events), id.to_string());
        SwipeRow::new(self.swipe_config, TimedAnimator::new(self.clock.clone()))
            .with_on_open(move || {
                opened.0.borrow_mut().push_back((opened.1.clone(), SwipeEvent::Opened))
            })
            .with_on_close(move || {
                closed.0.borrow_mut().push_back((closed.1.clone(), SwipeEvent::Closed))
            })
    }

    /// Reacts to open/close notifications queued by row callbacks. Opening a
    /// row closes every other open row.
    pub fn drain_swipe_events(&mut self) {
        loop {
            let next = self.swipe_events.borrow_mut().pop_front();
            let Some((id, event)) = next else {
                break;
            };
            debug!("event=row_swipe module=tui task={} swipe={:?}", id, event);
            if event == SwipeEvent::Opened {
                for (other, row) in self.rows.iter_mut() {
                    if *other != id {
                        row.close();
                    }
                }
            }
        }
    }

    /// Whether any row is mid-snap or mid-drag and needs frequent redraws.
    pub fn is_animating(&self) -> bool {
        self.rows
            .values()
            .any(|r| r.state().is_animating() || r.state().is_dragging())
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected
            .and_then(|i| self.controller.tasks().get(i))
            .map(|t| t.id.clone())
    }

    pub fn row(&self, id: &str) -> Option<&SwipeRow<TimedAnimator<C>>> {
        self.rows.get(id)
    }

    /// Width of the action area in columns.
    pub fn action_columns(&self) -> u16 {
        units_to_columns(-self.swipe_config.action_width)
    }

    /// Selects the next task, wrapping around.
    pub fn next(&mut self) {
        let len = self.controller.len();
        if len == 0 { return; }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        });
    }

    /// Selects the previous task, wrapping around.
    pub fn previous(&mut self) {
        let len = self.controller.len();
        if len == 0 { return; }
        self.selected = Some(match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Keeps the selection inside a window of `height` visible rows.
    pub fn ensure_visible(&mut self, height: usize) {
        let Some(i) = self.selected else {
            self.scroll_offset = 0;
            return;
        };
        if height == 0 { return; }
        if i < self.scroll_offset {
            self.scroll_offset = i;
        } else if i >= self.scroll_offset + height {
            self.scroll_offset = i + 1 - height;
        }
    }

    /// Flips completion of the selected task.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.controller.toggle(&id);
            self.sync();
        }
    }

    /// Deletes the selected task.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.delete(&id);
        }
    }

    fn delete(&mut self, id: &str) {
        if let Some(task) = self.controller.delete(id) {
            info!("event=task_deleted module=tui task={}", task.id);
        }
        self.sync();
    }

    /// Swipes the selected row open.
    pub fn open_selected(&mut self) {
        if let Some(row) = self.selected_id().and_then(|id| self.rows.get_mut(&id)) {
            row.open();
        }
        self.drain_swipe_events();
    }

    /// Swipes the selected row closed.
    pub fn close_selected(&mut self) {
        if let Some(row) = self.selected_id().and_then(|id| self.rows.get_mut(&id)) {
            row.close();
        }
        self.drain_swipe_events();
    }

    /// Enter in normal mode: runs the revealed action of an open row.
    pub fn activate_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.rows.get(&id).is_some_and(|r| r.state().is_open()) {
            self.delete(&id);
        }
    }

    /// Moves the selected task one place up (`-1`) or down (`1`).
    pub fn move_selected(&mut self, delta: isize) {
        let (Some(i), Some(id)) = (self.selected, self.selected_id()) else { return };
        let Some(target) = i.checked_add_signed(delta) else { return };
        if target >= self.controller.len() { return; }
        if self.controller.move_task(&id, target) {
            self.selected = Some(target);
        }
        self.sync();
    }

    /// Opens the "Add Task" input. A press in progress is cancelled since
    /// its release will not reach the rows.
    pub fn start_add(&mut self) {
        self.cancel_press();
        self.input_mode = InputMode::Adding;
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Submits the input box. Blank input keeps the box open.
    pub fn handle_input(&mut self) {
        if self.controller.add(&self.input_buffer).is_none() {
            return;
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.selected = Some(0);
        self.scroll_offset = 0;
        self.sync();
    }

    /// Maps a terminal cell to the index of the task drawn there.
    fn task_at(&self, column: u16, line: u16) -> Option<usize> {
        let area = self.list_area;
        if column < area.x || column >= area.right() || line < area.y || line >= area.bottom() {
            return None;
        }
        let index = self.scroll_offset + (line - area.y) as usize;
        (index < self.controller.len()).then_some(index)
    }

    fn in_action_area(&self, id: &str, column: u16) -> bool {
        let open = self.rows.get(id).is_some_and(|r| r.state().is_open());
        open && column >= self.list_area.right().saturating_sub(self.action_columns())
    }

    fn pointer(&self, column: u16, line: u16) -> (f32, f32, std::time::Duration) {
        let x = columns_to_units(column.saturating_sub(self.list_area.x));
        let y = line as f32 * UNITS_PER_LINE;
        (x, y, self.clock.now())
    }

    /// Ends the current press without a release, letting a panned row snap
    /// by its position.
    fn cancel_press(&mut self) {
        let Some(press) = self.press.take() else { return };
        if !press.on_action {
            if let Some(row) = self.rows.get_mut(&press.task_id) {
                row.handle_pointer(PointerEvent::Cancel);
            }
        }
        self.drain_swipe_events();
    }

    /// Routes a mouse event to the row under the pointer.
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let (column, line) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // The previous release was lost, e.g. outside the terminal.
                self.cancel_press();
                let Some(index) = self.task_at(column, line) else { return };
                self.selected = Some(index);
                let Some(id) = self.selected_id() else { return };
                let on_action = self.in_action_area(&id, column);
                if !on_action {
                    let (x, y, time) = self.pointer(column, line);
                    if let Some(row) = self.rows.get_mut(&id) {
                        row.handle_pointer(PointerEvent::Down { x, y, time });
                    }
                }
                self.press = Some(Press { task_id: id, on_action });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(press) = self.press.clone() else { return };
                if press.on_action { return; }
                let (x, y, time) = self.pointer(column, line);
                if let Some(row) = self.rows.get_mut(&press.task_id) {
                    row.handle_pointer(PointerEvent::Move { x, y, time });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(press) = self.press.take() else { return };
                if press.on_action {
                    let same_row = self
                        .task_at(column, line)
                        .and_then(|i| self.controller.tasks().get(i))
                        .is_some_and(|t| t.id == press.task_id);
                    if same_row && self.in_action_area(&press.task_id, column) {
                        self.delete(&press.task_id);
                    }
                } else {
                    let (x, y, time) = self.pointer(column, line);
                    if let Some(row) = self.rows.get_mut(&press.task_id) {
                        row.handle_pointer(PointerEvent::Up { x, y, time });
                    }
                }
            }
            MouseEventKind::ScrollDown => self.next(),
            MouseEventKind::ScrollUp => self.previous(),
            _ => {}
        }
        self.drain_swipe_events();
    }
}

const SAVE_FAILED: &str = "Save failed; changes are kept until exit.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::swipe::{ManualClock, Phase, ACTION_WIDTH, SNAP_DURATION};
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn app_with(titles: &[&str]) -> (App<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let mut controller = TaskController::new(store.clone(), "TODO_TASKS");
        for title in titles {
            controller.add(title);
        }
        let clock = ManualClock::new();
        let mut app = App::new(controller, clock.clone());
        app.list_area = Rect::new(1, 1, 40, 10);
        (app, store, clock)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    /// Drags the row drawn on `line` from column 30 to `to`, 16ms per column.
    fn swipe(app: &mut App<MemoryStore, ManualClock>, clock: &ManualClock, line: u16, to: u16) {
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, line));
        let mut column = 30;
        while column != to {
            column = if to < column { column - 1 } else { column + 1 };
            clock.advance(Duration::from_millis(16));
            app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), column, line));
        }
        clock.advance(Duration::from_millis(16));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), to, line));
    }

    #[test]
    fn lost_release_does_not_leave_a_row_mid_drag() {
        let (mut app, _, clock) = app_with(&["A", "B"]);
        let top = app.controller.tasks()[0].id.clone();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 1));
        clock.advance(Duration::from_millis(16));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 27, 1));
        assert!(app.row(&top).unwrap().state().is_dragging());

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 2));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 2));
        clock.advance(Duration::from_secs(5));

        let row = app.row(&top).unwrap();
        assert_eq!(row.state().phase(), Phase::Closed);
        assert_eq!(row.state().offset(), 0.0);
        assert!(!app.is_animating());
    }

    #[test]
    fn opening_the_input_box_cancels_a_drag() {
        let (mut app, _, clock) = app_with(&["A"]);
        let top = app.controller.tasks()[0].id.clone();

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 30, 1));
        clock.advance(Duration::from_millis(16));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 22, 1));
        app.start_add();
        clock.advance(SNAP_DURATION);

        let row = app.row(&top).unwrap();
        assert_eq!(row.state().phase(), Phase::Open);
        assert_eq!(row.state().offset(), -ACTION_WIDTH);
        assert!(!app.is_animating());
    }

    #[test]
    fn rows_follow_the_task_list() {
        let (mut app, _, _) = app_with(&["A", "B"]);
        assert_eq!(app.rows.len(), 2);
        app.start_add();
        app.input_buffer = "  C ".into();
        app.handle_input();
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.controller.tasks()[0].title, "C");
        app.delete_selected();
        assert_eq!(app.rows.len(), 2);
    }

    #[test]
    fn blank_input_keeps_the_box_open() {
        let (mut app, store, _) = app_with(&[]);
        app.start_add();
        app.input_buffer = "   ".into();
        app.handle_input();
        assert_eq!(app.input_mode, InputMode::Adding);
        assert!(app.controller.is_empty());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn mouse_swipe_opens_row_and_closes_the_other_open_one() {
        let (mut app, _, clock) = app_with(&["A", "B"]);
        let top = app.controller.tasks()[0].id.clone();
        let second = app.controller.tasks()[1].id.clone();

        swipe(&mut app, &clock, 2, 22);
        assert!(app.row(&second).unwrap().state().is_open());
        assert_eq!(app.selected, Some(1));

        clock.advance(Duration::from_millis(300));
        swipe(&mut app, &clock, 1, 22);
        assert!(app.row(&top).unwrap().state().is_open());
        assert!(!app.row(&second).unwrap().state().is_open());
    }

    #[test]
    fn click_on_action_area_deletes_and_tap_on_content_closes() {
        let (mut app, _, clock) = app_with(&["A", "B"]);
        let top = app.controller.tasks()[0].id.clone();

        swipe(&mut app, &clock, 1, 22);
        assert!(app.row(&top).unwrap().state().is_open());

        clock.advance(Duration::from_millis(300));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 5, 1));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 5, 1));
        assert!(!app.row(&top).unwrap().state().is_open());
        assert_eq!(app.controller.len(), 2);

        app.open_selected();
        clock.advance(Duration::from_millis(300));
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 38, 1));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 38, 1));
        assert_eq!(app.controller.len(), 1);
        assert!(app.row(&top).is_none());
    }

    #[test]
    fn keyboard_reorder_moves_selection_with_the_task() {
        let (mut app, store, _) = app_with(&["A", "B", "C"]);
        app.selected = Some(0);
        app.move_selected(1);
        assert_eq!(app.selected, Some(1));
        let titles: Vec<&str> = app.controller.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["B", "C", "A"]);

        let writes = store.writes();
        app.selected = Some(0);
        app.move_selected(-1);
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn enter_deletes_only_when_open() {
        let (mut app, _, _) = app_with(&["A"]);
        app.activate_selected();
        assert_eq!(app.controller.len(), 1);
        app.open_selected();
        app.activate_selected();
        assert!(app.controller.is_empty());
        assert_eq!(app.selected, None);
    }

    #[test]
    fn failed_saves_surface_in_the_status_line() {
        let (mut app, store, _) = app_with(&["A"]);
        store.fail_writes(true);
        app.toggle_selected();
        assert!(app.status.is_some());
        store.fail_writes(false);
        app.toggle_selected();
        assert!(app.status.is_none());
    }
}
