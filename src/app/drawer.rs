use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{ListItem, ListState};

use crate::app::models::ListFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerEntry {
    View(ListFilter),
    DeleteAll,
}

// The side menu: one entry per view, then the bulk delete at the bottom
#[derive(Debug, Default)]
pub struct DrawerState {
    pub is_open: bool,
    pub state: ListState,
}

impl DrawerState {
    pub fn entries() -> Vec<DrawerEntry> {
        ListFilter::ALL
            .into_iter()
            .map(DrawerEntry::View)
            .chain([DrawerEntry::DeleteAll])
            .collect()
    }

    // Open with the current view highlighted
    pub fn open(&mut self, current: ListFilter) {
        self.is_open = true;
        let index = Self::entries()
            .iter()
            .position(|entry| *entry == DrawerEntry::View(current));
        self.state.select(index);
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn next(&mut self) {
        let len = Self::entries().len();
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = Self::entries().len();
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn selected(&self) -> Option<DrawerEntry> {
        self.state
            .selected()
            .and_then(|i| Self::entries().get(i).copied())
    }
}

// Build the UI (list) for the drawer, marking the active view
pub fn get_drawer_items_ui<'a>(current: ListFilter) -> Vec<ListItem<'a>> {
    DrawerState::entries()
        .into_iter()
        .map(|entry| match entry {
            DrawerEntry::View(filter) => {
                let style = if filter == current {
                    Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(filter.title())).style(style)
            }
            DrawerEntry::DeleteAll => ListItem::new(Line::from("Delete all tasks"))
                .style(Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)),
        })
        .collect()
}
