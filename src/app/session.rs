// User-facing actions and the transient UI state they touch.
// The presentation layer turns input into `Command`s and hands them to
// `Session::dispatch`; it never mutates the store directly.
use chrono::NaiveDate;
use log::debug;

use crate::app::models::TaskId;
use crate::app::store::TaskStore;
use crate::app::view::{self, Projection, Stats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { text: String, date: Option<NaiveDate> },
    ToggleCompleted(TaskId),
    ToggleStarred(TaskId),
    Remove(TaskId),
    BeginEdit(TaskId),
    CommitEdit { id: TaskId, text: String },
    CancelEdit,
    SetSearchQuery(String),
}

pub struct Session {
    store: TaskStore,
    search_query: String,
    editing: Option<TaskId>,
}

impl Session {
    pub fn new(store: TaskStore) -> Session {
        Session {
            store,
            search_query: String::new(),
            editing: None,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn dispatch(&mut self, command: Command) {
        debug!("event=dispatch module=session command={command:?}");
        match command {
            Command::Add { text, date } => {
                self.store.add(&text, date);
            }
            Command::ToggleCompleted(id) => self.store.toggle_completed(id),
            Command::ToggleStarred(id) => self.store.toggle_starred(id),
            Command::Remove(id) => {
                if self.store.remove(id) && self.editing == Some(id) {
                    self.editing = None;
                }
            }
            Command::BeginEdit(id) => {
                if self.store.get(id).is_some() {
                    self.editing = Some(id);
                }
            }
            Command::CommitEdit { id, text } => {
                // Only the task in edit mode can be committed
                if self.editing != Some(id) {
                    debug!("event=commit_edit module=session status=skipped reason=not_editing id={id}");
                    return;
                }
                // Blank text behaves like a cancel
                self.store.edit(id, &text);
                self.editing = None;
            }
            Command::CancelEdit => self.editing = None,
            Command::SetSearchQuery(query) => self.search_query = query.trim().to_string(),
        }
    }

    // The presentation for the clock's current day
    pub fn projection(&self) -> Projection<'_> {
        view::project(
            self.store.tasks(),
            &self.search_query,
            self.editing,
            self.store.clock().today(),
        )
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(self.store.tasks(), self.store.clock().today())
    }

    pub fn today(&self) -> NaiveDate {
        self.store.clock().today()
    }
}
