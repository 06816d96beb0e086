use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{Task, TaskId};
use crate::app::session::Command;
use derivative::Derivative;

use super::ui::App;

// What the dialog is collecting input for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogKind {
    #[default]
    Add,
    Edit(TaskId),
    Search,
}

// State object for the input dialog
// Keeps track of the state of the dialog and the content being typed
#[derive(Derivative)]
#[derivative(Default)]
pub struct TaskEditDialogState {
    pub dialog_active: bool,
    kind: DialogKind,
    content: Option<TaskEditDialogContent>,
    error_message: Option<String>,
    // (char column, field row)
    cursor_position: Option<(usize, usize)>,
}

// Current content of the fields
#[derive(Derivative)]
#[derivative(Default)]
struct TaskEditDialogContent {
    text: String,
    due_date: String,
}

impl TaskEditDialogState {
    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    // Opens the dialog and prepares to accept an input for a new task
    pub fn create_a_new_task(&mut self) {
        self.open(DialogKind::Add, TaskEditDialogContent::default());
    }

    // Opens the dialog prefilled with the text of an existing task
    pub fn edit_task(&mut self, task: &Task) {
        let content = TaskEditDialogContent {
            text: task.text.clone(),
            due_date: String::new(),
        };
        let end = content.text.chars().count();
        self.open(DialogKind::Edit(task.id), content);
        self.cursor_position = Some((end, 0));
    }

    // Opens the dialog for typing a search query, starting from the current one
    pub fn search(&mut self, current_query: &str) {
        let content = TaskEditDialogContent {
            text: current_query.to_string(),
            due_date: String::new(),
        };
        let end = content.text.chars().count();
        self.open(DialogKind::Search, content);
        self.cursor_position = Some((end, 0));
    }

    fn open(&mut self, kind: DialogKind, content: TaskEditDialogContent) {
        self.dialog_active = true;
        self.kind = kind;
        self.content = Some(content);
        self.error_message = None;
        self.cursor_position = Some((0, 0));
    }

    fn close(&mut self) {
        self.dialog_active = false;
        self.content = None;
        self.error_message = None;
        self.cursor_position = None;
    }

    fn field_count(&self) -> usize {
        match self.kind {
            DialogKind::Add => 2,
            DialogKind::Edit(_) | DialogKind::Search => 1,
        }
    }

    fn cursor(&self) -> (usize, usize) {
        self.cursor_position.unwrap_or((0, 0))
    }

    // Move the cursor one line BELOW the current one, keeping the column where possible
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor();
        let future_y = (y + 1).min(self.field_count() - 1);
        self.cursor_position = Some((x.min(self.field_len(future_y)), future_y));
    }

    // Move the cursor one line ABOVE the current one, keeping the column where possible
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor();
        if y > 0 {
            self.cursor_position = Some((x.min(self.field_len(y - 1)), y - 1));
        }
    }

    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor();
        if x > 0 {
            self.cursor_position = Some((x - 1, y));
        }
    }

    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor();
        self.cursor_position = Some(((x + 1).min(self.field_len(y)), y));
    }

    fn field_mut(&mut self, y: usize) -> Option<&mut String> {
        let content = self.content.as_mut()?;
        match y {
            0 => Some(&mut content.text),
            1 => Some(&mut content.due_date),
            _ => None,
        }
    }

    fn field(&self, y: usize) -> &str {
        match (self.content.as_ref(), y) {
            (Some(content), 0) => &content.text,
            (Some(content), 1) => &content.due_date,
            _ => "",
        }
    }

    fn field_len(&self, y: usize) -> usize {
        self.field(y).chars().count()
    }

    // Delete the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor();
        if x == 0 {
            return;
        }
        if let Some(field) = self.field_mut(y) {
            if let Some((byte, _)) = field.char_indices().nth(x - 1) {
                field.remove(byte);
            }
        }
        self.move_cursor_left();
    }

    // Insert a char at the cursor in the active field
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor();
        if let Some(field) = self.field_mut(y) {
            let byte = field
                .char_indices()
                .nth(x)
                .map_or(field.len(), |(byte, _)| byte);
            field.insert(byte, to_insert);
        }
        self.move_cursor_right();
    }

    // The query currently typed into a search dialog
    pub fn live_query(&self) -> Option<Command> {
        match self.kind {
            DialogKind::Search if self.dialog_active => {
                Some(Command::SetSearchQuery(self.field(0).to_string()))
            }
            _ => None,
        }
    }

    // Turn the dialog content into a command and close the dialog.
    // An unparseable date keeps the dialog open with an error message.
    pub fn save_task(&mut self) -> Option<Command> {
        if !self.dialog_active {
            return None;
        }
        let command = match self.kind {
            DialogKind::Add => {
                let due_date = self.field(1).trim();
                let date = if due_date.is_empty() {
                    None
                } else {
                    match NaiveDate::parse_from_str(due_date, "%Y-%m-%d") {
                        Ok(date) => Some(date),
                        Err(_e) => {
                            self.error_message =
                                Some("Date should be in format yyyy-mm-dd".to_string());
                            return None;
                        }
                    }
                };
                Command::Add {
                    text: self.field(0).to_string(),
                    date,
                }
            }
            DialogKind::Edit(id) => Command::CommitEdit {
                id,
                text: self.field(0).to_string(),
            },
            DialogKind::Search => Command::SetSearchQuery(self.field(0).to_string()),
        };
        self.close();
        Some(command)
    }

    // Close without saving. Returns the command that undoes any live effect.
    pub fn cancel(&mut self) -> Option<Command> {
        if !self.dialog_active {
            return None;
        }
        let command = match self.kind {
            DialogKind::Add => None,
            DialogKind::Edit(_) => Some(Command::CancelEdit),
            DialogKind::Search => Some(Command::SetSearchQuery(String::new())),
        };
        self.close();
        command
    }
}

// Returns the UI content for the input dialog
pub fn get_task_edit_ui<'b>(app: &'b App<'_>) -> Vec<Line<'b>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);
    let dialog = &app.task_edit_dialog_state;
    let mut text = Vec::new();

    struct TextDialogInputLine {
        prefix: &'static str,
        placeholder: &'static str,
        value: String,
    }

    // Define the lines (input fields) of the dialog
    let mut lines = vec![TextDialogInputLine {
        prefix: match dialog.kind {
            DialogKind::Search => "Search: ",
            _ => "Task:   ",
        },
        placeholder: match dialog.kind {
            DialogKind::Search => "groceries",
            _ => "What needs doing?",
        },
        value: dialog.field(0).to_string(),
    }];
    if dialog.kind == DialogKind::Add {
        lines.push(TextDialogInputLine {
            prefix: "Due:    ",
            placeholder: "2024-11-23 (optional)",
            value: dialog.field(1).to_string(),
        });
    }

    let (cursor_x, cursor_y) = dialog.cursor();

    for (i, line) in lines.iter().enumerate() {
        let mut spans = vec![Span::styled(line.prefix, WHITE_TEXT)];

        if line.value.is_empty() {
            if cursor_y == i {
                // Selected empty line: highlight the first placeholder char, gray the rest
                spans.push(Span::styled(
                    line.placeholder.chars().take(1).collect::<String>(),
                    BLACK_ON_WHITE,
                ));
                spans.push(Span::styled(
                    line.placeholder.chars().skip(1).collect::<String>(),
                    GRAY_TEXT,
                ));
            } else {
                spans.push(Span::styled(line.placeholder, GRAY_TEXT));
            }
        } else if cursor_y == i {
            // All chars are white, except for the one at the cursor position which is highlighted
            spans.push(Span::styled(
                line.value.chars().take(cursor_x).collect::<String>(),
                WHITE_TEXT,
            ));
            spans.push(Span::styled(
                line.value.chars().skip(cursor_x).take(1).collect::<String>(),
                BLACK_ON_WHITE,
            ));
            spans.push(Span::styled(
                line.value.chars().skip(cursor_x + 1).collect::<String>(),
                WHITE_TEXT,
            ));
            if cursor_x == line.value.chars().count() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            }
        } else {
            spans.push(Span::styled(line.value.clone(), WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    if let Some(ref error_message) = dialog.error_message {
        text.push(Line::from(vec![Span::styled(
            error_message.as_str(),
            Style::new().fg(Color::Red),
        )]));
        text.push(Line::raw(""));
    }

    let help = match dialog.kind {
        DialogKind::Search => "Enter - keep filter, Esc - clear",
        _ => "Enter - save, Esc - cancel",
    };
    text.push(Line::from(vec![Span::styled(help, WHITE_TEXT)]));

    text
}
