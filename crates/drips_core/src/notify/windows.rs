use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_TITLE, CELEBRATION_TEXT, Celebrator};
use tauri_winrt_notification::Toast;

pub struct WindowsCelebrator;

impl Celebrator for WindowsCelebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_TITLE)
            .text1(CELEBRATION_TEXT)
            .text2(&task.title)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
