pub mod background;
pub mod clock;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;
pub mod task_edit;
pub mod task_list;
pub mod ui;
pub mod view;
