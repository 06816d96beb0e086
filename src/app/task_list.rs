use chrono::NaiveDate;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::TaskId;
use crate::app::view::{format_date_label, Projection, Stats};

use super::ui::App;

// Selection over the rows of the current projection
#[derive(Default)]
pub struct TaskList {
    pub state: ListState,
    rows: Vec<TaskId>,
    selected: Option<usize>,
}

impl TaskList {
    // Refresh the rows from a new projection, keeping the selected task selected
    pub fn update_items(&mut self, projection: &Projection) {
        let selected_id = self.get_selected();
        self.rows = projection.rows().iter().map(|row| row.task.id).collect();
        self.selected = match selected_id {
            Some(id) => self
                .rows
                .iter()
                .position(|row| *row == id)
                .or_else(|| self.selected.map(|i| i.min(self.rows.len().saturating_sub(1))))
                .filter(|_| !self.rows.is_empty()),
            None => None,
        };
    }

    // Move the selection to the next row, wrapping at the end
    pub fn next(&mut self) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let i = match self.selected {
            Some(i) if i < self.rows.len() - 1 => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    // Move the selection to the previous row, wrapping at the start
    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            self.selected = None;
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    pub fn unselect(&mut self) {
        self.selected = None;
    }

    pub fn get_selected(&self) -> Option<TaskId> {
        self.selected.and_then(|i| self.rows.get(i).copied())
    }

    // Point the widget state at the list item of the selected row
    pub fn sync_state(&mut self, row_positions: &[usize]) {
        self.state
            .select(self.selected.and_then(|i| row_positions.get(i).copied()));
    }
}

// Build the list items for the projection: a header per section followed by its rows.
// Also returns, for each row, the index of its list item.
pub fn get_list_items_ui<'a>(
    projection: &Projection<'a>,
    today: NaiveDate,
) -> (Vec<ListItem<'a>>, Vec<usize>) {
    let mut items = Vec::new();
    let mut row_positions = Vec::new();

    let sections = match projection {
        Projection::Sections(sections) => sections,
        Projection::Empty(reason) => {
            items.push(ListItem::new(Line::from(Span::from(reason.message()).fg(Color::Gray))));
            return (items, row_positions);
        }
    };

    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            items.push(ListItem::new(""));
        }
        items.push(ListItem::new(Line::from(vec![
            Span::from(format!("{} {} ", section.bucket.emoji(), section.label())).bold(),
            Span::from(format!("({})", section.count())).fg(Color::Magenta),
        ])));

        for row in &section.rows {
            let task = row.task;
            let mut spans = vec![
                Span::from(if task.completed { "  [✓] " } else { "  [ ] " }),
                Span::from(if task.starred { "★ " } else { "  " }).fg(Color::Yellow),
            ];

            let text = Span::from(task.text.as_str());
            spans.push(if task.completed {
                text.fg(Color::DarkGray).crossed_out()
            } else {
                text.fg(Color::White)
            });

            if let Some(date) = task.date {
                let color = if task.is_overdue(today) {
                    Color::Red
                } else {
                    Color::Cyan
                };
                spans.push(Span::from(format!("  {}", format_date_label(date, today))).fg(color));
            }
            if row.editing {
                spans.push(Span::from("  (editing)").fg(Color::LightMagenta));
            }

            row_positions.push(items.len());
            items.push(ListItem::new(Line::from(spans)));
        }
    }

    (items, row_positions)
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui<'a>(stats: Stats) -> Vec<Line<'a>> {
    vec![
        Line::from(format!("Total tasks: {}", stats.total)),
        Line::from(format!("Open tasks: {}", stats.open)),
        Line::from(format!("Completed: {}", stats.completed)),
        Line::from(format!("Starred: {}", stats.starred)),
        Line::from(format!("Due this week: {}", stats.due_this_week)),
        Line::from(format!("Late: {}", stats.overdue)),
    ]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>(app: &App<'_>) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = vec![
        "Enter - toggle do/done".into(),
        "a - add a task".into(),
        "e - edit a task".into(),
        "s - star a task".into(),
        "x - delete a task".into(),
        "/ - search".into(),
        "q - quit".into(),
    ];
    let query = app.session.search_query();
    if !query.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("Filter: \"{query}\" (Esc clears)"),
            Style::new().fg(Color::Yellow),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Task;
    use crate::app::view::project;
    use chrono::{Duration, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn tasks() -> Vec<Task> {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        vec![
            Task::new("today", Some(today()), created),
            Task::new("later", None, created + Duration::minutes(1)),
            Task::new("tomorrow", Some(today() + Duration::days(1)), created),
        ]
    }

    #[test]
    fn headers_are_skipped_in_row_positions() {
        let tasks = tasks();
        let projection = project(&tasks, "", None, today());
        let (items, positions) = get_list_items_ui(&projection, today());

        // header, row, spacer, header, row, spacer, header, row
        assert_eq!(items.len(), 8);
        assert_eq!(positions, vec![1, 4, 7]);
    }

    #[test]
    fn empty_projection_renders_a_message_and_no_rows() {
        let projection = project(&[], "", None, today());
        let (items, positions) = get_list_items_ui(&projection, today());
        assert_eq!(items.len(), 1);
        assert!(positions.is_empty());
    }

    #[test]
    fn selection_wraps_and_follows_the_task() {
        let tasks = tasks();
        let mut list = TaskList::default();
        list.update_items(&project(&tasks, "", None, today()));

        list.previous();
        assert_eq!(list.get_selected(), Some(tasks[1].id));
        list.next();
        assert_eq!(list.get_selected(), Some(tasks[0].id));

        // Filtering the selected task away keeps a valid selection
        list.update_items(&project(&tasks, "tom", None, today()));
        assert_eq!(list.get_selected(), Some(tasks[2].id));

        list.update_items(&project(&tasks, "zzz", None, today()));
        assert_eq!(list.get_selected(), None);
    }

    #[test]
    fn selection_survives_reordering() {
        let mut tasks = tasks();
        let mut list = TaskList::default();
        list.update_items(&project(&tasks, "", None, today()));
        list.previous();
        assert_eq!(list.get_selected(), Some(tasks[1].id));

        tasks[1].starred = true;
        list.update_items(&project(&tasks, "", None, today()));
        assert_eq!(list.get_selected(), Some(tasks[1].id));
    }
}
