use crate::error::AppError;

pub mod json_store;
mod memory;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

pub const BANK_KEY: &str = "taskBank";
const DAILY_KEY_PREFIX: &str = "dailyTasks_";

/// Synchronous string key-value persistence behind the task store.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

pub fn daily_key(date_key: &str) -> String {
    format!("{DAILY_KEY_PREFIX}{date_key}")
}

#[cfg(test)]
mod tests {
    use super::daily_key;

    #[test]
    fn daily_key_embeds_date() {
        assert_eq!(daily_key("2025-01-02"), "dailyTasks_2025-01-02");
    }
}
