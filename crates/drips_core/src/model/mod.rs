mod task;

pub use task::{CompletionRecord, DailyTask, Direction, SortOption, Task};
