use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;
use tracing::{debug, error, info};

use crate::app::models::{ListFilter, NewTask, Task};
use crate::app::prompt::{Confirm, Feedback, Prompt};
use crate::app::storage::Storage;
use crate::app::task_input::TaskInput;
use crate::error::Result;

// In-memory snapshot of one view of the store, plus the input field and edit state.
// Mutations apply the row the store hands back; whole reloads happen on mount,
// on view change, on a new refresh token and after a bulk delete.
pub struct TaskList<'a> {
    pub state: ListState,
    pub items: Vec<Task>,
    pub input: TaskInput,
    storage: &'a Storage,
    filter: ListFilter,
    editing: Option<i64>,
    completed_collapsed: bool,
    refresh_token: u64,
    feedback: Box<dyn Feedback + 'a>,
}

impl<'a> TaskList<'a> {
    // Initialize a task list with items from the database
    pub fn with_items_from_storage(
        storage: &'a Storage,
        filter: ListFilter,
        feedback: Box<dyn Feedback + 'a>,
    ) -> TaskList<'a> {
        let mut list = TaskList {
            state: ListState::default(),
            items: Vec::new(),
            input: TaskInput::default(),
            storage,
            filter,
            editing: None,
            completed_collapsed: false,
            refresh_token: 0,
            feedback,
        };
        list.update_items();
        list
    }

    pub fn filter(&self) -> ListFilter {
        self.filter
    }

    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub fn completed_collapsed(&self) -> bool {
        self.completed_collapsed
    }

    // Replace the snapshot with a fresh query; on failure the old snapshot stays
    pub fn update_items(&mut self) {
        let selected = self.selected_id();
        match self.storage.get_tasks(self.filter) {
            Ok(tasks) => {
                debug!(filter = ?self.filter, count = tasks.len(), "tasks reloaded");
                self.items = tasks;
                self.restore_selection(selected);
            }
            Err(e) => error!(filter = ?self.filter, error = %e, "failed to load tasks"),
        }
    }

    // Reload when the token differs from the last one seen
    pub fn refresh(&mut self, token: u64) {
        if token != self.refresh_token {
            self.refresh_token = token;
            self.update_items();
        }
    }

    // Switch the view. An edit in progress does not carry over.
    pub fn set_filter(&mut self, filter: ListFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.cancel_edit();
        self.state.select(None);
        self.update_items();
    }

    // Add a task, or save the title of the one being edited.
    // Blank input does nothing; otherwise the field is cleared whether or not the store call succeeds.
    pub fn submit(&mut self) {
        if self.input.is_blank() {
            return;
        }
        let title = self.input.text().to_string();

        match self.editing.take() {
            Some(id) => {
                let result = self.storage.update_title(id, &title);
                self.apply_update(id, result, "update title");
            }
            None => {
                let new_task = NewTask {
                    title,
                    is_important: false,
                    category: self.filter.insert_category().to_string(),
                };
                match self.storage.insert_task(&new_task) {
                    Ok(task) => {
                        if self.filter.matches(&task) {
                            let selected = self.selected_id();
                            self.items.insert(0, task);
                            self.restore_selection(selected);
                        }
                    }
                    Err(e) => error!(error = %e, "failed to insert task"),
                }
            }
        }

        self.input.clear();
    }

    // Load a task into the input field; nothing is written until submit
    pub fn begin_edit(&mut self, task: &Task) {
        self.input.set(&task.title);
        self.editing = Some(task.id);
    }

    pub fn cancel_edit(&mut self) {
        self.input.clear();
        self.editing = None;
    }

    pub fn toggle_completed(&mut self, task: &Task) {
        self.feedback.task_toggled(task);
        let result = self.storage.update_completed(task.id, !task.completed);
        self.apply_update(task.id, result, "toggle completed");
    }

    pub fn toggle_important(&mut self, task: &Task) {
        let result = self.storage.update_important(task.id, !task.is_important);
        self.apply_update(task.id, result, "toggle important");
    }

    pub fn toggle_planned(&mut self, task: &Task) {
        let result = self.storage.update_planned(task.id, !task.is_planned);
        self.apply_update(task.id, result, "toggle planned");
    }

    // Returns whether the user agreed and the row is gone
    pub fn delete(&mut self, task: &Task, confirm: &mut dyn Confirm) -> bool {
        let prompt = Prompt::DeleteTask {
            title: task.title.clone(),
        };
        if !confirm.confirm(&prompt) {
            return false;
        }

        if let Err(e) = self.storage.delete_task(task.id) {
            error!(id = task.id, error = %e, "failed to delete task");
            return false;
        }

        let selected = self.selected_id();
        self.items.retain(|item| item.id != task.id);
        if self.editing == Some(task.id) {
            self.cancel_edit();
        }
        self.restore_selection(selected);
        true
    }

    // Returns whether the user agreed and the store was emptied.
    // The snapshot is emptied with it; callers that track a refresh token reload through it.
    pub fn delete_all(&mut self, confirm: &mut dyn Confirm) -> bool {
        if !confirm.confirm(&Prompt::DeleteAll) {
            return false;
        }

        match self.storage.delete_all() {
            Ok(removed) => {
                info!(removed, "task list cleared");
                self.cancel_edit();
                self.items.clear();
                self.state.select(None);
                true
            }
            Err(e) => {
                error!(error = %e, "failed to delete all tasks");
                false
            }
        }
    }

    pub fn toggle_completed_section(&mut self) {
        let selected = self.selected_id();
        self.completed_collapsed = !self.completed_collapsed;
        self.restore_selection(selected);
    }

    // Get the tasks still to do
    pub fn get_active(&self) -> Vec<&Task> {
        self.items.iter().filter(|task| !task.completed).collect()
    }

    // Get the completed tasks
    pub fn get_completed(&self) -> Vec<&Task> {
        self.items.iter().filter(|task| task.completed).collect()
    }

    // Rows in display order: active first, then completed unless collapsed
    pub fn get_visible(&self) -> Vec<&Task> {
        let mut visible = self.get_active();
        if !self.completed_collapsed {
            visible.extend(self.get_completed());
        }
        visible
    }

    // Move the selection to the next item
    pub fn next(&mut self) {
        let len = self.get_visible().len();
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 || i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item
    pub fn previous(&mut self) {
        let len = self.get_visible().len();
        let i = match self.state.selected() {
            Some(i) => {
                if len == 0 {
                    0
                } else if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    // Get the selected task
    pub fn get_selected(&self) -> Option<&Task> {
        self.state
            .selected()
            .and_then(|i| self.get_visible().get(i).copied())
    }

    fn apply_update(&mut self, id: i64, result: Result<Option<Task>>, action: &str) {
        let selected = self.selected_id();
        match result {
            Ok(Some(task)) => {
                if let Some(position) = self.items.iter().position(|item| item.id == id) {
                    if self.filter.matches(&task) {
                        self.items[position] = task;
                    } else {
                        self.items.remove(position);
                    }
                }
            }
            Ok(None) => {
                debug!(id, action, "task no longer exists");
                self.items.retain(|item| item.id != id);
            }
            Err(e) => error!(id, action, error = %e, "failed to update task"),
        }
        self.restore_selection(selected);
    }

    fn selected_id(&self) -> Option<i64> {
        self.get_selected().map(|task| task.id)
    }

    // Keep the cursor on the same task after the snapshot changed.
    // A task that left the visible rows keeps the old position, clamped to the new length.
    fn restore_selection(&mut self, selected: Option<i64>) {
        let position =
            selected.and_then(|id| self.get_visible().iter().position(|task| task.id == id));
        if position.is_some() {
            self.state.select(position);
            return;
        }

        let len = self.get_visible().len();
        match self.state.selected() {
            Some(_) if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }
}

// Build the UI (list) for the visible tasks, with a header row above the completed section.
// Returns the items and the index of the header row, if any.
pub fn get_list_items_ui<'a>(list: &'a TaskList) -> (Vec<ListItem<'a>>, Option<usize>) {
    let active = list.get_active();
    let completed = list.get_completed();

    let mut items: Vec<ListItem> = active.into_iter().map(task_list_item).collect();

    if completed.is_empty() {
        return (items, None);
    }

    let header_index = items.len();
    let marker = if list.completed_collapsed() { "▸" } else { "▾" };
    items.push(
        ListItem::new(Line::from(format!("{marker} Completed ({})", completed.len())))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    );

    if !list.completed_collapsed() {
        items.extend(completed.into_iter().map(task_list_item));
    }

    (items, Some(header_index))
}

fn task_list_item<'a>(task: &'a Task) -> ListItem<'a> {
    let mut spans = vec![Span::from(if task.completed { "(✓) " } else { "( ) " })];

    let title = Span::from(task.title.as_str());
    spans.push(if task.completed {
        title.fg(Color::DarkGray).crossed_out()
    } else {
        title.fg(Color::White)
    });

    if task.is_planned {
        spans.push(Span::from(" ▣").fg(Color::Cyan));
    }
    if task.is_important {
        spans.push(Span::from(" ★").fg(Color::Red));
    }

    ListItem::new(Line::from(spans))
}

// Build the UI (lines) for the key help
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    vec![
        "a add · e edit · Enter/Space done · s star · p plan · x delete".into(),
        "c collapse done · m menu · r refresh · 1-4 views · q quit".into(),
    ]
}
