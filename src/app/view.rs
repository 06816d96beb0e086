// Presentation order of the task list.
// Filters by search text, sorts starred/dated/newest first and splits the
// result into Today, Tomorrow and Later. Nothing here is stored; every
// render recomputes it from the tasks and the current day.
use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};

use crate::app::models::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Today,
    Tomorrow,
    Later,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Today, Bucket::Tomorrow, Bucket::Later];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Tomorrow => "Tomorrow",
            Bucket::Later => "Later",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Bucket::Today => "🔥",
            Bucket::Tomorrow => "📅",
            Bucket::Later => "📆",
        }
    }

    // Which bucket a task dated `date` falls in when evaluated on `today`
    pub fn for_date(date: Option<NaiveDate>, today: NaiveDate) -> Bucket {
        match date {
            Some(date) if date == today => Bucket::Today,
            Some(date) if Some(date) == today.succ_opt() => Bucket::Tomorrow,
            _ => Bucket::Later,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    pub task: &'a Task,
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub bucket: Bucket,
    pub rows: Vec<Row<'a>>,
}

impl<'a> Section<'a> {
    pub fn label(&self) -> &'static str {
        self.bucket.label()
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoTasks,
    NoMatches,
}

impl EmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::NoTasks => "No tasks yet. Add one to get started!",
            EmptyReason::NoMatches => "No tasks found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection<'a> {
    Sections(Vec<Section<'a>>),
    Empty(EmptyReason),
}

impl<'a> Projection<'a> {
    // Rows in display order across all sections
    pub fn rows(&self) -> Vec<Row<'a>> {
        match self {
            Projection::Sections(sections) => sections
                .iter()
                .flat_map(|section| section.rows.iter().copied())
                .collect(),
            Projection::Empty(_) => Vec::new(),
        }
    }
}

pub fn project<'a>(
    tasks: &'a [Task],
    query: &str,
    editing: Option<TaskId>,
    today: NaiveDate,
) -> Projection<'a> {
    let mut visible = filter(tasks, query);
    if visible.is_empty() {
        return Projection::Empty(if tasks.is_empty() {
            EmptyReason::NoTasks
        } else {
            EmptyReason::NoMatches
        });
    }

    // sort_by is stable, so full ties keep their input order
    visible.sort_by(|a, b| compare(a, b));

    let sections = Bucket::ALL
        .iter()
        .map(|&bucket| Section {
            bucket,
            rows: visible
                .iter()
                .filter(|task| Bucket::for_date(task.date, today) == bucket)
                .map(|&task| Row {
                    task,
                    editing: editing == Some(task.id),
                })
                .collect(),
        })
        .filter(|section| !section.rows.is_empty())
        .collect();

    Projection::Sections(sections)
}

// Case-insensitive substring match on the task text. An empty query keeps everything.
pub fn filter<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    if query.is_empty() {
        return tasks.iter().collect();
    }
    let query = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| task.text.to_lowercase().contains(&query))
        .collect()
}

// Starred first, then dated before undated with earlier days first, then newest first
pub fn compare(a: &Task, b: &Task) -> Ordering {
    b.starred
        .cmp(&a.starred)
        .then_with(|| match (a.date, b.date) {
            (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

// "Today", "Tomorrow", "Mar 5", or "Mar 5, 2027" outside the current year
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if Some(date) == today.succ_opt() {
        return "Tomorrow".to_string();
    }
    let label = date.format("%b %-d").to_string();
    if date.year() != today.year() {
        format!("{label}, {}", date.year())
    } else {
        label
    }
}

// Counts shown in the statistics pane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub open: usize,
    pub completed: usize,
    pub starred: usize,
    pub overdue: usize,
    pub due_this_week: usize,
}

impl Stats {
    pub fn collect(tasks: &[Task], today: NaiveDate) -> Stats {
        let week_end = today + Duration::weeks(1);
        tasks.iter().fold(Stats::default(), |mut stats, task| {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.open += 1;
            }
            if task.starred {
                stats.starred += 1;
            }
            if task.is_overdue(today) {
                stats.overdue += 1;
            }
            if !task.completed && task.date.is_some_and(|date| date >= today && date < week_end) {
                stats.due_this_week += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, minute, 0).unwrap()
    }

    fn task(text: &str, date: Option<NaiveDate>, starred: bool, minute: u32) -> Task {
        let mut task = Task::new(text, date, at(minute));
        task.starred = starred;
        task
    }

    fn day(offset: i64) -> Option<NaiveDate> {
        Some(today() + Duration::days(offset))
    }

    fn texts(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|row| row.task.text.clone()).collect()
    }

    fn sections<'p, 'a>(projection: &'p Projection<'a>) -> &'p [Section<'a>] {
        match projection {
            Projection::Sections(sections) => sections,
            Projection::Empty(reason) => panic!("unexpected empty projection: {reason:?}"),
        }
    }

    #[test]
    fn starred_undated_outranks_unstarred_today_but_sits_in_later() {
        let tasks = vec![task("A", day(0), false, 1), task("B", None, true, 2)];
        let projection = project(&tasks, "", None, today());

        assert_eq!(compare(&tasks[1], &tasks[0]), Ordering::Less);
        let mut ranked: Vec<&Task> = tasks.iter().collect();
        ranked.sort_by(|a, b| compare(a, b));
        let ranked: Vec<&str> = ranked.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(ranked, vec!["B", "A"]);

        let Projection::Sections(sections) = &projection else {
            panic!("expected sections");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].bucket, Bucket::Today);
        assert_eq!(texts(&sections[0].rows), vec!["A"]);
        assert_eq!(sections[1].bucket, Bucket::Later);
        assert_eq!(texts(&sections[1].rows), vec!["B"]);
    }

    #[test]
    fn search_is_case_insensitive_on_text() {
        let tasks = vec![
            task("Buy groceries", None, false, 1),
            task("Call mom", None, false, 2),
        ];
        for query in ["gro", "GRO", "gRo"] {
            let projection = project(&tasks, query, None, today());
            assert_eq!(texts(&projection.rows()), vec!["Buy groceries"]);
        }
    }

    #[test]
    fn sort_orders_by_star_then_date_then_newest() {
        let tasks = vec![
            task("undated old", None, false, 1),
            task("undated new", None, false, 5),
            task("later date", day(9), false, 2),
            task("earlier date", day(3), false, 3),
            task("starred late", day(20), true, 4),
            task("starred undated", None, true, 6),
        ];
        let mut sorted: Vec<&Task> = tasks.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));
        let order: Vec<&str> = sorted.iter().map(|task| task.text.as_str()).collect();

        assert_eq!(
            order,
            vec![
                "starred late",
                "starred undated",
                "earlier date",
                "later date",
                "undated new",
                "undated old",
            ]
        );
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let tasks = vec![
            task("first", day(4), false, 7),
            task("second", day(4), false, 7),
            task("third", day(4), false, 7),
        ];
        let projection = project(&tasks, "", None, today());
        assert_eq!(texts(&projection.rows()), vec!["first", "second", "third"]);
    }

    #[test]
    fn buckets_partition_the_filtered_tasks() {
        let tasks = vec![
            task("yesterday", day(-1), false, 1),
            task("today", day(0), false, 2),
            task("tomorrow", day(1), true, 3),
            task("next week", day(7), false, 4),
            task("someday", None, false, 5),
            task("today too", day(0), true, 6),
        ];
        let projection = project(&tasks, "", None, today());
        let sections = sections(&projection);

        let total: usize = sections.iter().map(Section::count).sum();
        assert_eq!(total, tasks.len());
        for task in &tasks {
            let hits = sections
                .iter()
                .filter(|section| section.rows.iter().any(|row| row.task.id == task.id))
                .count();
            assert_eq!(hits, 1, "{} should be in exactly one bucket", task.text);
        }

        assert_eq!(texts(&sections[0].rows), vec!["today too", "today"]);
        assert_eq!(texts(&sections[1].rows), vec!["tomorrow"]);
        assert_eq!(
            texts(&sections[2].rows),
            vec!["yesterday", "next week", "someday"]
        );
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let tasks = vec![task("tomorrow", day(1), false, 1)];
        let projection = project(&tasks, "", None, today());
        let sections = sections(&projection);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label(), "Tomorrow");
        assert_eq!(sections[0].count(), 1);
    }

    #[test]
    fn empty_state_tells_no_tasks_from_no_matches() {
        assert_eq!(
            project(&[], "", None, today()),
            Projection::Empty(EmptyReason::NoTasks)
        );
        assert_eq!(
            project(&[], "milk", None, today()),
            Projection::Empty(EmptyReason::NoTasks)
        );

        let tasks = vec![task("Call mom", None, false, 1)];
        assert_eq!(
            project(&tasks, "milk", None, today()),
            Projection::Empty(EmptyReason::NoMatches)
        );
    }

    #[test]
    fn editing_marker_is_carried_on_the_row() {
        let tasks = vec![task("a", None, false, 1), task("b", None, false, 2)];
        let projection = project(&tasks, "", Some(tasks[0].id), today());
        let rows = projection.rows();
        let editing: Vec<&str> = rows
            .iter()
            .filter(|row| row.editing)
            .map(|row| row.task.text.as_str())
            .collect();
        assert_eq!(editing, vec!["a"]);
    }

    #[test]
    fn bucket_moves_as_the_day_advances() {
        let tasks = vec![task("dentist", day(1), false, 1)];

        let projection = project(&tasks, "", None, today());
        assert_eq!(sections(&projection)[0].bucket, Bucket::Tomorrow);

        let next_day = today() + Duration::days(1);
        let projection = project(&tasks, "", None, next_day);
        assert_eq!(sections(&projection)[0].bucket, Bucket::Today);

        let two_days_later = today() + Duration::days(2);
        let projection = project(&tasks, "", None, two_days_later);
        assert_eq!(sections(&projection)[0].bucket, Bucket::Later);
    }

    #[test]
    fn tomorrow_bucket_spans_month_and_year_ends() {
        let new_years_eve = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert_eq!(Bucket::for_date(new_year, new_years_eve), Bucket::Tomorrow);
        assert_eq!(Bucket::for_date(None, new_years_eve), Bucket::Later);
    }

    #[test]
    fn date_labels() {
        let today = today();
        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(today + Duration::days(1), today), "Tomorrow");
        assert_eq!(
            format_date_label(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), today),
            "Mar 5"
        );
        assert_eq!(
            format_date_label(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), today),
            "Jan 15, 2025"
        );
    }

    #[test]
    fn stats_count_open_overdue_and_upcoming() {
        let mut done = task("done", day(-3), false, 1);
        done.completed = true;
        let tasks = vec![
            done,
            task("late", day(-2), true, 2),
            task("soon", day(2), false, 3),
            task("far", day(30), false, 4),
            task("someday", None, false, 5),
        ];
        assert_eq!(
            Stats::collect(&tasks, today()),
            Stats {
                total: 5,
                open: 4,
                completed: 1,
                starred: 1,
                overdue: 1,
                due_this_week: 1,
            }
        );
    }
}
