use crate::model::{DailyTask, SortOption, Task};
use deunicode::deunicode;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use time::OffsetDateTime;

/// Returns a sorted copy of `tasks`. Every mode is stable for equal keys.
pub fn sort_tasks(tasks: &[Task], option: SortOption) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match option {
        SortOption::MostUsed => {
            sorted.sort_by_key(|task| std::cmp::Reverse(completion_count(task)));
        }
        SortOption::RecentlyUsed => sorted.sort_by(compare_recently_used),
        SortOption::Alphabetical => sorted.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
    sorted
}

fn compare_recently_used(a: &Task, b: &Task) -> Ordering {
    match (latest_completion(a), latest_completion(b)) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    }
}

// Transliterated and case-folded first, so "Éclair" files under "e" and
// "apple" comes before "Banana".
fn compare_titles(a: &str, b: &str) -> Ordering {
    deunicode(a)
        .to_lowercase()
        .cmp(&deunicode(b).to_lowercase())
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

pub fn latest_completion(task: &Task) -> Option<OffsetDateTime> {
    task.completions
        .iter()
        .filter(|record| record.completed)
        .map(|record| record.timestamp)
        .max()
}

pub fn is_task_completed_today(task: &Task, today_key: &str) -> bool {
    task.completion_for(today_key)
        .is_some_and(|record| record.completed)
}

pub fn completion_count(task: &Task) -> usize {
    task.completions
        .iter()
        .filter(|record| record.completed)
        .count()
}

/// Draws `min(count, tasks.len())` distinct tasks uniformly at random and
/// numbers them in draw order.
pub fn select_daily<R>(tasks: &[Task], count: usize, rng: &mut R) -> Vec<DailyTask>
where
    R: Rng + ?Sized,
{
    let amount = count.min(tasks.len());
    let mut pool: Vec<&Task> = tasks.iter().collect();
    let (picked, _) = pool.partial_shuffle(rng, amount);
    picked
        .iter()
        .enumerate()
        .map(|(order, task)| DailyTask {
            task: (*task).clone(),
            order,
        })
        .collect()
}
