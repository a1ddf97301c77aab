use derivative::Derivative;

pub const CATEGORY_MY_DAY: &str = "MyDay";
pub const CATEGORY_TASKS: &str = "Tasks";

// A single row of the tasks table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub is_important: bool,
    pub is_planned: bool,
    pub category: String,
}

// The columns a caller supplies on insert; the rest come from the table defaults
#[derive(Derivative, Debug, Clone, PartialEq, Eq)]
#[derivative(Default)]
pub struct NewTask {
    pub title: String,
    pub is_important: bool,
    #[derivative(Default(value = "CATEGORY_TASKS.to_string()"))]
    pub category: String,
}

// The views of the task list. Each one restricts the rows returned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ListFilter {
    #[default]
    MyDay,
    Important,
    Planned,
    #[value(name = "tasks")]
    All,
}

impl ListFilter {
    pub const ALL: [ListFilter; 4] = [
        ListFilter::MyDay,
        ListFilter::Important,
        ListFilter::Planned,
        ListFilter::All,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ListFilter::MyDay => "My Day",
            ListFilter::Important => "Important",
            ListFilter::Planned => "Planned",
            ListFilter::All => "Tasks",
        }
    }

    // Category assigned to tasks created while this view is active
    pub fn insert_category(self) -> &'static str {
        match self {
            ListFilter::MyDay => CATEGORY_MY_DAY,
            _ => CATEGORY_TASKS,
        }
    }

    // Mirrors the WHERE clause the store applies for this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            ListFilter::MyDay => task.category == CATEGORY_MY_DAY,
            ListFilter::Important => task.is_important,
            ListFilter::Planned => task.is_planned,
            ListFilter::All => true,
        }
    }
}
