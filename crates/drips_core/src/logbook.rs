use crate::model::Task;
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogbookEntry {
    pub task_id: String,
    pub title: String,
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogbookDay {
    pub date: String,
    pub entries: Vec<LogbookEntry>,
}

/// Completed records grouped by date, newest day first and newest entry first
/// within a day. Records toggled back to incomplete are left out.
pub fn build_logbook(tasks: &[Task]) -> Vec<LogbookDay> {
    let mut by_date: BTreeMap<&str, Vec<LogbookEntry>> = BTreeMap::new();
    for task in tasks {
        for record in task.completions.iter().filter(|record| record.completed) {
            by_date
                .entry(record.date.as_str())
                .or_default()
                .push(LogbookEntry {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    timestamp: record.timestamp,
                });
        }
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut entries)| {
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            LogbookDay {
                date: date.to_string(),
                entries,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_logbook;
    use crate::model::{CompletionRecord, Task};
    use time::macros::datetime;

    #[test]
    fn groups_completed_records_newest_first() {
        let created = datetime!(2025-01-01 00:00 UTC);
        let tasks = vec![
            Task {
                id: "a".to_string(),
                title: "Read".to_string(),
                completions: vec![
                    CompletionRecord {
                        date: "2025-01-02".to_string(),
                        completed: true,
                        timestamp: datetime!(2025-01-02 08:00 UTC),
                    },
                    CompletionRecord {
                        date: "2025-01-03".to_string(),
                        completed: false,
                        timestamp: datetime!(2025-01-03 08:00 UTC),
                    },
                ],
                created_at: created,
                scheduled_time: None,
            },
            Task {
                id: "b".to_string(),
                title: "Walk".to_string(),
                completions: vec![
                    CompletionRecord {
                        date: "2025-01-02".to_string(),
                        completed: true,
                        timestamp: datetime!(2025-01-02 19:00 UTC),
                    },
                    CompletionRecord {
                        date: "2025-01-04".to_string(),
                        completed: true,
                        timestamp: datetime!(2025-01-04 07:00 UTC),
                    },
                ],
                created_at: created,
                scheduled_time: None,
            },
        ];

        let logbook = build_logbook(&tasks);

        let dates: Vec<&str> = logbook.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-04", "2025-01-02"]);
        let titles: Vec<&str> = logbook[1]
            .entries
            .iter()
            .map(|entry| entry.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Walk", "Read"]);
    }

    #[test]
    fn empty_when_nothing_completed() {
        assert!(build_logbook(&[]).is_empty());
    }
}
