// The task collection and every mutation on it.
// Each mutation runs to completion in memory and is followed by a write of
// the full collection. A failed write is logged; memory stays authoritative.
use chrono::NaiveDate;
use log::{debug, error, info};

use crate::app::clock::Clock;
use crate::app::models::{Task, TaskId};
use crate::app::storage::Storage;

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
    clock: Box<dyn Clock>,
}

impl TaskStore {
    // Build a store from whatever the storage holds
    pub fn open(storage: Storage, clock: Box<dyn Clock>) -> TaskStore {
        let tasks = storage.load();
        info!(
            "event=store_open module=store status=ok count={}",
            tasks.len()
        );
        TaskStore {
            tasks,
            storage,
            clock,
        }
    }

    // Raw order is newest-first; presentation order comes from the view
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // Prepend a new task. Blank text is discarded.
    pub fn add(&mut self, text: &str, date: Option<NaiveDate>) -> Option<TaskId> {
        let text = text.trim();
        if text.is_empty() {
            debug!("event=task_add module=store status=skipped reason=empty_text");
            return None;
        }

        let task = Task::new(text, date, self.clock.now());
        let id = task.id;
        self.tasks.insert(0, task);
        self.persist();
        info!("event=task_add module=store status=ok id={id}");
        Some(id)
    }

    pub fn toggle_completed(&mut self, id: TaskId) {
        self.apply_for_task(id, "task_toggle_completed", |task| {
            task.completed = !task.completed
        });
    }

    pub fn toggle_starred(&mut self, id: TaskId) {
        self.apply_for_task(id, "task_toggle_starred", |task| {
            task.starred = !task.starred
        });
    }

    // Replace the text. Blank text leaves the task untouched.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            debug!("event=task_edit module=store status=skipped reason=empty_text id={id}");
            return false;
        }
        self.apply_for_task(id, "task_edit", |task| task.text = new_text.to_string())
    }

    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            debug!("event=task_remove module=store status=skipped reason=not_found id={id}");
            return false;
        }
        self.persist();
        info!("event=task_remove module=store status=ok id={id}");
        true
    }

    // Run `function` on the task with `id` and persist. Unknown ids are ignored.
    fn apply_for_task(&mut self, id: TaskId, event: &str, function: impl FnOnce(&mut Task)) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => function(task),
            None => {
                debug!("event={event} module=store status=skipped reason=not_found id={id}");
                return false;
            }
        }
        self.persist();
        info!("event={event} module=store status=ok id={id}");
        true
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.tasks) {
            error!(
                "event=tasks_save module=store status=error key={} error={}",
                self.storage.key(),
                err
            );
        }
    }
}
