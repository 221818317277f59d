use crate::model::Task;
use time::OffsetDateTime;

const STARTER_TITLES: [&str; 8] = [
    "Exercise for 30 minutes",
    "Read a book chapter",
    "Meditate for 10 minutes",
    "Write in journal",
    "Learn something new",
    "Drink 8 glasses of water",
    "Take a walk outside",
    "Practice gratitude",
];

/// Starter bank written the first time no bank record exists. Starter tasks
/// carry short numeric ids, which generated ids never are.
pub fn default_tasks(now: OffsetDateTime) -> Vec<Task> {
    STARTER_TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| Task {
            id: (index + 1).to_string(),
            title: (*title).to_string(),
            completions: Vec::new(),
            created_at: now,
            scheduled_time: None,
        })
        .collect()
}

pub fn is_default_task_id(id: &str) -> bool {
    id.len() <= 2
}
