// A terminal task list.
//
// Tasks are grouped into Today, Tomorrow and Later, ordered starred first,
// then by due day, then newest first. The whole collection is persisted as
// one JSON blob under a single key of a SQLite key-value table.

pub mod app;
pub mod config;
pub mod errors;
pub mod logging;

pub use app::models::{Task, TaskId};
pub use app::session::{Command, Session};
pub use app::storage::{MemorySlot, Slot, SqliteSlot, Storage};
pub use app::store::TaskStore;
pub use app::view::{project, Bucket, EmptyReason, Projection};
pub use errors::{AppError, AppResult};
