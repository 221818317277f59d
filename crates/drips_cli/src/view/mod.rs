//! Terminal rendering of the store's current state. Nothing here mutates the
//! store.

use drips_core::config::Palette;
use drips_core::logbook::LogbookDay;
use drips_core::model::{DailyTask, SortOption, Task};
use drips_core::task_utils::{completion_count, is_task_completed_today};
use drips_core::time_util::{format_clock_time, format_date_heading, format_time};
use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};

mod embed;

pub use embed::{ResizeReporter, embed_code, render_embedded};

const DONE_MARK: &str = "[x]";
const OPEN_MARK: &str = "[ ]";

#[derive(Tabled)]
struct BankRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Today")]
    today: &'static str,
    #[tabled(rename = "Done")]
    completions: usize,
    #[tabled(rename = "Time")]
    time: String,
}

pub fn render_bank(tasks: &[Task], sort: SortOption, today: &str, palette: &Palette) -> String {
    let heading = palette.accentize(&format!("Task Bank ({} tasks, sorted by {sort})", tasks.len()));
    if tasks.is_empty() {
        return format!(
            "{heading}\nYour task bank is empty\n{}",
            palette.mutedize("Add tasks to get started")
        );
    }

    let rows = tasks.iter().map(|task| BankRow {
        id: task.id.clone(),
        title: task.title.clone(),
        today: if is_task_completed_today(task, today) {
            DONE_MARK
        } else {
            OPEN_MARK
        },
        completions: completion_count(task),
        time: format_time(task.scheduled_time.as_deref()),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{heading}\n{table}")
}

pub fn render_daily(daily: &[DailyTask], today: &str, palette: &Palette) -> String {
    let done = daily
        .iter()
        .filter(|entry| is_task_completed_today(&entry.task, today))
        .count();
    let heading = palette.accentize(&format!("Today {today} ({done}/{} done)", daily.len()));
    if daily.is_empty() {
        return format!(
            "{heading}\nNo tasks for today\n{}",
            palette.mutedize("Generate tasks from your bank to get started")
        );
    }

    let mut lines = vec![heading];
    lines.extend(daily.iter().map(|entry| daily_line(entry, today, palette)));
    lines.join("\n")
}

pub(crate) fn daily_line(entry: &DailyTask, today: &str, palette: &Palette) -> String {
    let task = &entry.task;
    let mark = if is_task_completed_today(task, today) {
        DONE_MARK
    } else {
        OPEN_MARK
    };
    let mut line = format!("{:>2}. {mark} {}", entry.order + 1, task.title);
    let time = format_time(task.scheduled_time.as_deref());
    if !time.is_empty() {
        line.push_str(&format!(" @ {time}"));
    }
    line.push_str(&palette.mutedize(&format!("  ({})", task.id)));
    line
}

pub fn render_logbook(days: &[LogbookDay], palette: &Palette) -> String {
    let heading = palette.accentize("Logbook");
    if days.is_empty() {
        return format!(
            "{heading}\nYour logbook is empty\n{}",
            palette.mutedize("Complete tasks to see them here")
        );
    }

    let mut lines = vec![heading];
    for day in days {
        lines.push(String::new());
        lines.push(format_date_heading(&day.date));
        for entry in &day.entries {
            lines.push(format!(
                "  {DONE_MARK} {}{}",
                entry.title,
                palette.mutedize(&format!(
                    "  completed at {}",
                    format_clock_time(entry.timestamp)
                ))
            ));
        }
    }
    lines.join("\n")
}

pub fn task_json(task: &Task, today: &str) -> Value {
    let mut value = serde_json::to_value(task).unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = value {
        map.insert(
            "completed_today".to_string(),
            Value::Bool(is_task_completed_today(task, today)),
        );
        map.insert(
            "completion_count".to_string(),
            json!(completion_count(task)),
        );
        map.insert(
            "display_time".to_string(),
            Value::String(format_time(task.scheduled_time.as_deref())),
        );
    }
    value
}

pub fn tasks_json(tasks: &[Task], today: &str) -> Value {
    Value::Array(tasks.iter().map(|task| task_json(task, today)).collect())
}

pub fn daily_json(daily: &[DailyTask], today: &str) -> Value {
    let entries = daily
        .iter()
        .map(|entry| {
            let mut value = task_json(&entry.task, today);
            if let Value::Object(ref mut map) = value {
                map.insert("order".to_string(), json!(entry.order));
            }
            value
        })
        .collect();
    json!({ "date": today, "tasks": Value::Array(entries) })
}

pub fn logbook_json(days: &[LogbookDay]) -> Value {
    let days = days
        .iter()
        .map(|day| {
            let entries: Vec<Value> = day
                .entries
                .iter()
                .map(|entry| {
                    json!({
                        "task_id": entry.task_id,
                        "title": entry.title,
                        "time": format_clock_time(entry.timestamp),
                    })
                })
                .collect();
            json!({ "date": day.date, "entries": entries })
        })
        .collect();
    Value::Array(days)
}

#[cfg(test)]
mod tests {
    use super::{daily_json, render_bank, render_daily, render_logbook, task_json};
    use drips_core::config::palette_for_theme;
    use drips_core::logbook::build_logbook;
    use drips_core::model::{CompletionRecord, DailyTask, SortOption, Task};
    use time::macros::datetime;

    fn task(id: &str, title: &str, done_on: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            completions: done_on
                .map(|date| CompletionRecord {
                    date: date.to_string(),
                    completed: true,
                    timestamp: datetime!(2025-06-10 18:04 UTC),
                })
                .into_iter()
                .collect(),
            created_at: datetime!(2025-06-01 00:00 UTC),
            scheduled_time: Some("14:30".to_string()),
        }
    }

    #[test]
    fn bank_lists_each_task_with_schedule() {
        let palette = palette_for_theme(None);
        let output = render_bank(
            &[task("a1", "Read", Some("2025-06-10")), task("b2", "Walk", None)],
            SortOption::MostUsed,
            "2025-06-10",
            &palette,
        );

        assert!(output.contains("sorted by mostUsed"));
        assert!(output.contains("Read"));
        assert!(output.contains("2:30 PM"));
        assert!(output.contains("[x]"));
    }

    #[test]
    fn empty_views_show_hints() {
        let palette = palette_for_theme(None);

        assert!(render_bank(&[], SortOption::Alphabetical, "2025-06-10", &palette)
            .contains("Your task bank is empty"));
        assert!(render_daily(&[], "2025-06-10", &palette).contains("No tasks for today"));
        assert!(render_logbook(&[], &palette).contains("Your logbook is empty"));
    }

    #[test]
    fn daily_lines_are_numbered_from_one() {
        let palette = palette_for_theme(None);
        let daily = vec![
            DailyTask {
                task: task("a1", "Read", Some("2025-06-10")),
                order: 0,
            },
            DailyTask {
                task: task("b2", "Walk", None),
                order: 1,
            },
        ];

        let output = render_daily(&daily, "2025-06-10", &palette);

        assert!(output.contains("(1/2 done)"));
        assert!(output.contains(" 1. [x] Read @ 2:30 PM"));
        assert!(output.contains(" 2. [ ] Walk @ 2:30 PM"));
    }

    #[test]
    fn logbook_uses_long_date_headings() {
        let palette = palette_for_theme(None);
        let days = build_logbook(&[task("a1", "Read", Some("2025-06-10"))]);

        let output = render_logbook(&days, &palette);

        assert!(output.contains("Tuesday, June 10, 2025"));
        assert!(output.contains("Read"));
        assert!(output.contains("completed at 6:04 PM"));
    }

    #[test]
    fn json_views_carry_derived_fields() {
        let value = task_json(&task("a1", "Read", Some("2025-06-10")), "2025-06-10");
        assert_eq!(value["completed_today"], true);
        assert_eq!(value["completion_count"], 1);
        assert_eq!(value["display_time"], "2:30 PM");
        assert_eq!(value["created_at"], "2025-06-01T00:00:00Z");

        let daily = daily_json(
            &[DailyTask {
                task: task("a1", "Read", None),
                order: 0,
            }],
            "2025-06-10",
        );
        assert_eq!(daily["date"], "2025-06-10");
        assert_eq!(daily["tasks"][0]["order"], 0);
        assert_eq!(daily["tasks"][0]["completed_today"], false);
    }
}
