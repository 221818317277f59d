use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_TITLE, CELEBRATION_TEXT, Celebrator};
use notify_rust::Notification;

pub struct LinuxCelebrator;

impl Celebrator for LinuxCelebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError> {
        Notification::new()
            .summary(APP_TITLE)
            .body(&format!("{CELEBRATION_TEXT}\n{}", task.title))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
