use crate::error::AppError;
use crate::model::{DailyTask, Task};
use crate::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_DIR_ENV_VAR: &str = "DRIPS_STORE_DIR";
const APP_DIR_NAME: &str = "daily-drips";

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<T> {
    schema_version: u32,
    tasks: Vec<T>,
}

pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn store_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    app_dir()
}

pub fn encode_bank(tasks: &[Task]) -> Result<String, AppError> {
    encode(tasks)
}

pub fn decode_bank(content: &str) -> Result<Vec<Task>, AppError> {
    decode(content)
}

pub fn encode_daily(tasks: &[DailyTask]) -> Result<String, AppError> {
    encode(tasks)
}

/// Decodes a day's selection and re-numbers `order` from stored positions,
/// so a hand-edited file cannot break the contiguous ordering.
pub fn decode_daily(content: &str) -> Result<Vec<DailyTask>, AppError> {
    let mut tasks: Vec<DailyTask> = decode(content)?;
    tasks.sort_by_key(|entry| entry.order);
    for (index, entry) in tasks.iter_mut().enumerate() {
        entry.order = index;
    }
    Ok(tasks)
}

fn encode<T: Serialize + Clone>(tasks: &[T]) -> Result<String, AppError> {
    let snapshot = Snapshot {
        schema_version: SCHEMA_VERSION,
        tasks: tasks.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn decode<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, AppError> {
    let stored: Snapshot<T> = serde_json::from_str(content)?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.tasks)
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(AppError::invalid_input(format!(
                "storage key '{key}' must be ASCII alphanumeric, '_' or '-'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    #[tracing::instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        JsonFileStore, SCHEMA_VERSION, decode_bank, decode_daily, encode_bank, encode_daily,
    };
    use crate::model::{CompletionRecord, DailyTask, Task};
    use crate::storage::KeyValueStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::datetime;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("drips-{nanos}-{name}"))
    }

    fn sample_task() -> Task {
        Task {
            id: "c0ffee".to_string(),
            title: "Read".to_string(),
            completions: vec![CompletionRecord {
                date: "2025-12-20".to_string(),
                completed: true,
                timestamp: datetime!(2025-12-20 07:15:30.123456789 +01:00),
            }],
            created_at: datetime!(2025-12-01 00:00 UTC),
            scheduled_time: Some("07:30".to_string()),
        }
    }

    #[test]
    fn bank_and_daily_survive_a_round_trip() {
        let bank = vec![sample_task()];
        let daily = vec![DailyTask {
            task: sample_task(),
            order: 0,
        }];

        let decoded_bank = decode_bank(&encode_bank(&bank).unwrap()).unwrap();
        let decoded_daily = decode_daily(&encode_daily(&daily).unwrap()).unwrap();

        assert_eq!(decoded_bank, bank);
        assert_eq!(decoded_daily, daily);
    }

    #[test]
    fn daily_record_flattens_task_fields() {
        let daily = vec![DailyTask {
            task: sample_task(),
            order: 0,
        }];

        let value: serde_json::Value =
            serde_json::from_str(&encode_daily(&daily).unwrap()).unwrap();

        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["tasks"][0]["title"], "Read");
        assert_eq!(value["tasks"][0]["order"], 0);
    }

    #[test]
    fn accepts_task_without_optional_fields() {
        let content = "{\n  \"schema_version\": 1,\n  \"tasks\": [\n    {\n      \"id\": \"1\",\n      \"title\": \"demo\",\n      \"created_at\": \"2025-12-20T00:00:00Z\"\n    }\n  ]\n}";

        let loaded = decode_bank(content).unwrap();

        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].completions.is_empty());
        assert_eq!(loaded[0].scheduled_time, None);
    }

    #[test]
    fn decode_daily_renumbers_orders() {
        let content = serde_json::json!({
            "schema_version": 1,
            "tasks": [
                { "id": "b", "title": "B", "created_at": "2025-12-20T00:00:00Z", "order": 7 },
                { "id": "a", "title": "A", "created_at": "2025-12-20T00:00:00Z", "order": 2 }
            ]
        });

        let loaded = decode_daily(&content.to_string()).unwrap();

        assert_eq!(loaded[0].task.id, "a");
        assert_eq!(loaded[0].order, 0);
        assert_eq!(loaded[1].task.id, "b");
        assert_eq!(loaded[1].order, 1);
    }

    #[test]
    fn rejects_non_boolean_completed_field() {
        let content = "{\"schema_version\": 1, \"tasks\": [{\"id\": \"1\", \"title\": \"demo\", \"created_at\": \"2025-12-20T00:00:00Z\", \"completions\": [{\"date\": \"2025-12-20\", \"completed\": \"yes\", \"timestamp\": \"2025-12-20T00:00:00Z\"}]}]}";

        let err = decode_bank(content).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn schema_version_must_match() {
        let bad = format!(
            "{{\n  \"schema_version\": {},\n  \"tasks\": []\n}}",
            SCHEMA_VERSION + 1
        );

        let err = decode_bank(&bad).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn file_store_reads_back_what_it_wrote() {
        let dir = temp_dir("file-store");
        let mut store = JsonFileStore::new(&dir);

        assert_eq!(store.read("taskBank").unwrap(), None);
        store.write("taskBank", "{}").unwrap();
        let loaded = store.read("taskBank").unwrap();
        let on_disk = dir.join("taskBank.json").exists();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.as_deref(), Some("{}"));
        assert!(on_disk);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let store = JsonFileStore::new(temp_dir("bad-key"));

        let err = store.read("../escape").unwrap_err();

        assert_eq!(err.code(), "invalid_input");
    }
}
