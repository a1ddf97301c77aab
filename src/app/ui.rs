use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::debug;

use crate::app::drawer::{get_drawer_items_ui, DrawerEntry, DrawerState};
use crate::app::models::{ListFilter, Task};
use crate::app::prompt::{Answer, Feedback, Prompt};
use crate::app::storage::Storage;
use crate::app::task_input::get_task_input_ui;
use crate::app::task_list::*;

// What a yes/no dialog is waiting to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete(Task),
    DeleteAll,
}

impl PendingAction {
    pub fn prompt(&self) -> Prompt {
        match self {
            PendingAction::Delete(task) => Prompt::DeleteTask {
                title: task.title.clone(),
            },
            PendingAction::DeleteAll => Prompt::DeleteAll,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input,
    Drawer,
    Confirm(PendingAction),
}

pub struct App<'a> {
    pub items: TaskList<'a>,
    pub drawer: DrawerState,
    pub mode: Mode,
    pub refresh_token: u64,
}

impl<'a> App<'a> {
    pub fn new(
        storage: &'a Storage,
        filter: ListFilter,
        feedback: Box<dyn Feedback + 'a>,
    ) -> App<'a> {
        App {
            items: TaskList::with_items_from_storage(storage, filter, feedback),
            drawer: DrawerState::default(),
            mode: Mode::Normal,
            refresh_token: 0,
        }
    }

    // Bump the token the list watches, forcing a reload
    pub fn refresh(&mut self) {
        self.refresh_token += 1;
        self.items.refresh(self.refresh_token);
    }

    // Handle a single key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode.clone() {
            Mode::Normal => return self.handle_normal_key(code),
            Mode::Input => self.handle_input_key(code),
            Mode::Drawer => self.handle_drawer_key(code),
            Mode::Confirm(action) => self.handle_confirm_key(code, action),
        }
        false
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        let selected = self.items.get_selected().cloned();
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Down => self.items.next(),
            KeyCode::Up => self.items.previous(),
            KeyCode::Left => self.items.unselect(),
            KeyCode::Char('a') => {
                if self.items.editing().is_some() {
                    self.items.cancel_edit();
                }
                self.mode = Mode::Input;
            }
            KeyCode::Char('e') => {
                if let Some(task) = selected {
                    self.items.begin_edit(&task);
                    self.mode = Mode::Input;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(task) = selected {
                    self.items.toggle_completed(&task);
                }
            }
            KeyCode::Char('s') => {
                if let Some(task) = selected {
                    self.items.toggle_important(&task);
                }
            }
            KeyCode::Char('p') => {
                if let Some(task) = selected {
                    self.items.toggle_planned(&task);
                }
            }
            KeyCode::Char('x') => {
                if let Some(task) = selected {
                    self.mode = Mode::Confirm(PendingAction::Delete(task));
                }
            }
            KeyCode::Char('c') => self.items.toggle_completed_section(),
            KeyCode::Char('m') => {
                self.drawer.open(self.items.filter());
                self.mode = Mode::Drawer;
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                self.items.set_filter(ListFilter::ALL[index]);
            }
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let was_editing = self.items.editing().is_some();
                self.items.submit();
                if was_editing && self.items.editing().is_none() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Esc => {
                if self.items.editing().is_some() {
                    self.items.cancel_edit();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Left => self.items.input.move_cursor_left(),
            KeyCode::Right => self.items.input.move_cursor_right(),
            KeyCode::Backspace => self.items.input.delete_char(),
            KeyCode::Char(to_insert) => self.items.input.input(to_insert),
            _ => {}
        }
    }

    fn handle_drawer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down => self.drawer.next(),
            KeyCode::Up => self.drawer.previous(),
            KeyCode::Esc | KeyCode::Char('m') => {
                self.drawer.close();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => match self.drawer.selected() {
                Some(DrawerEntry::View(filter)) => {
                    self.items.set_filter(filter);
                    self.drawer.close();
                    self.mode = Mode::Normal;
                }
                Some(DrawerEntry::DeleteAll) => {
                    self.mode = Mode::Confirm(PendingAction::DeleteAll);
                }
                None => {}
            },
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode, action: PendingAction) {
        let mut answer = match code {
            KeyCode::Char('y') | KeyCode::Enter => Answer(true),
            KeyCode::Char('n') | KeyCode::Esc => Answer(false),
            _ => return,
        };

        match action {
            PendingAction::Delete(task) => {
                self.items.delete(&task, &mut answer);
                self.mode = Mode::Normal;
            }
            PendingAction::DeleteAll => {
                if self.items.delete_all(&mut answer) {
                    self.refresh();
                    self.drawer.close();
                    self.mode = Mode::Normal;
                } else {
                    self.mode = Mode::Drawer;
                }
            }
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                    debug!("quit requested");
                    return Ok(());
                }
            }
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, app: &mut App) {
    let mut area = f.size();

    // The drawer takes the left part of the screen while open
    if app.drawer.is_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);

        let drawer = List::new(get_drawer_items_ui(app.items.filter()))
            .block(Block::default().borders(Borders::ALL).title("Menu"))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        f.render_stateful_widget(drawer, chunks[0], &mut app.drawer.state);
        area = chunks[1];
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(area);

    // Header: view title and today's date
    let header = Paragraph::new(vec![
        Line::from(Span::from(app.items.filter().title()).bold()),
        Line::from(Span::from(Local::now().format("%A, %-d %B").to_string()).fg(Color::Gray)),
    ])
    .block(Block::new().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    // Task list; the completed header row shifts the highlighted index
    let (list_items, header_index) = get_list_items_ui(&app.items);
    let mut display_state = ListState::default();
    display_state.select(app.items.state.selected().map(|i| match header_index {
        Some(header) if i >= header => i + 1,
        _ => i,
    }));
    let task_list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title("List"))
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(task_list, chunks[1], &mut display_state);

    // Input field
    let editing = app.items.editing().is_some();
    let (placeholder, title) = if editing {
        ("Edit task", "Edit (Enter - save, Esc - cancel)")
    } else {
        ("Add a task", "New task")
    };
    let input = Paragraph::new(get_task_input_ui(
        &app.items.input,
        placeholder,
        app.mode == Mode::Input,
    ))
    .block(Block::new().title(title).borders(Borders::ALL));
    f.render_widget(input, chunks[2]);

    let instructions = Paragraph::new(get_instructions_ui()).style(Style::new().gray());
    f.render_widget(instructions, chunks[3]);

    if let Mode::Confirm(action) = &app.mode {
        draw_confirm(f, &action.prompt());
    }
}

fn draw_confirm(f: &mut Frame, prompt: &Prompt) {
    let area = centered_rect(50, 25, f.size());
    let dialog = Paragraph::new(vec![
        Line::from(prompt.message()),
        Line::from(""),
        Line::from(Span::from("y - yes, n - no").fg(Color::Gray)),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(prompt.title())
            .border_style(Style::default().fg(Color::LightRed)),
    );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::prompt::NoFeedback;
    use ratatui::backend::TestBackend;

    fn storage() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        storage.create_table_if_not_exists().unwrap();
        storage
    }

    fn type_text(app: &mut App, text: &str) {
        text.chars().for_each(|c| {
            app.handle_key(KeyCode::Char(c));
        });
    }

    fn add_task(app: &mut App, title: &str) {
        app.handle_key(KeyCode::Char('a'));
        type_text(app, title);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Esc);
    }

    #[test]
    fn typing_and_enter_adds_a_task() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));

        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.mode, Mode::Input);
        // 'q' is text while typing
        type_text(&mut app, "quick");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.mode, Mode::Input);
        assert_eq!(app.items.items.len(), 1);
        assert_eq!(app.items.items[0].title, "quick");
        assert_eq!(storage.get_tasks(ListFilter::All).unwrap().len(), 1);
    }

    #[test]
    fn delete_waits_for_the_answer() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        add_task(&mut app, "Buy milk");
        app.handle_key(KeyCode::Down);

        app.handle_key(KeyCode::Char('x'));
        assert!(matches!(app.mode, Mode::Confirm(PendingAction::Delete(_))));
        app.handle_key(KeyCode::Char('z'));
        assert!(matches!(app.mode, Mode::Confirm(_)));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.items.items.len(), 1);

        app.handle_key(KeyCode::Char('x'));
        app.handle_key(KeyCode::Char('y'));
        assert!(app.items.items.is_empty());
        assert!(storage.get_tasks(ListFilter::All).unwrap().is_empty());
    }

    #[test]
    fn edit_via_keys_keeps_identity() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        add_task(&mut app, "Buy milk");
        let id = app.items.items[0].id;

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('e'));
        assert_eq!(app.items.editing(), Some(id));
        type_text(&mut app, " and eggs");
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        let rows = storage.get_tasks(ListFilter::All).unwrap();
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].title, "Buy milk and eggs");
    }

    #[test]
    fn enter_twice_toggles_the_same_row_back() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        add_task(&mut app, "one");
        add_task(&mut app, "two");

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Enter);

        let rows: Vec<(String, bool)> = storage
            .get_tasks(ListFilter::All)
            .unwrap()
            .into_iter()
            .map(|task| (task.title, task.completed))
            .collect();
        assert_eq!(rows, vec![("two".to_string(), false), ("one".to_string(), false)]);
    }

    #[test]
    fn delete_all_from_drawer_closes_it() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        add_task(&mut app, "one");
        add_task(&mut app, "two");

        app.handle_key(KeyCode::Char('m'));
        assert!(app.drawer.is_open);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Confirm(PendingAction::DeleteAll));

        app.handle_key(KeyCode::Esc);
        assert_eq!(app.mode, Mode::Drawer);
        assert_eq!(app.items.items.len(), 2);

        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('y'));
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.drawer.is_open);
        assert!(app.items.items.is_empty());
        assert_eq!(app.refresh_token, 1);
    }

    #[test]
    fn drawer_switches_view() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::MyDay, Box::new(NoFeedback));
        add_task(&mut app, "today");

        app.handle_key(KeyCode::Char('m'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.items.filter(), ListFilter::Important);
        assert!(app.items.items.is_empty());

        app.handle_key(KeyCode::Char('1'));
        assert_eq!(app.items.filter(), ListFilter::MyDay);
        assert_eq!(app.items.items.len(), 1);
    }

    #[test]
    fn quit_only_from_normal_mode() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        app.handle_key(KeyCode::Char('m'));
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Esc);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn draws_without_panicking() {
        let storage = storage();
        let mut app = App::new(&storage, ListFilter::All, Box::new(NoFeedback));
        add_task(&mut app, "done");
        add_task(&mut app, "open");
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert!(app.items.items[1].completed);
        app.handle_key(KeyCode::Char('m'));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Confirm(PendingAction::DeleteAll));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, &mut app)).unwrap();
    }
}
