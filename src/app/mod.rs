pub mod drawer;
pub mod models;
pub mod prompt;
pub mod storage;
pub mod task_input;
pub mod task_list;
pub mod ui;
