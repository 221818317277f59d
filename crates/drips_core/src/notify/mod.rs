use crate::error::AppError;
use crate::model::Task;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxCelebrator;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsCelebrator;

pub const DISABLE_ENV_VAR: &str = "DRIPS_DISABLE_NOTIFICATIONS";
pub(crate) const APP_TITLE: &str = "Daily Drips";
pub(crate) const CELEBRATION_TEXT: &str = "Task completed! Great job!";

/// Discrete changes the store reports to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TaskAdded { id: String, title: String },
    TaskRemoved { id: String, title: String },
    TaskCompleted { id: String, title: String },
    ScheduleSet { id: String, time: String },
    ScheduleCleared { id: String },
    DailyGenerated { count: usize },
    DefaultsCleared { count: usize },
}

impl StoreEvent {
    pub fn message(&self) -> String {
        match self {
            Self::TaskAdded { .. } => "Task added to your bank".to_string(),
            Self::TaskRemoved { .. } => "Task removed from your bank".to_string(),
            Self::TaskCompleted { .. } => CELEBRATION_TEXT.to_string(),
            Self::ScheduleSet { .. } => "Task scheduled".to_string(),
            Self::ScheduleCleared { .. } => "Task schedule removed".to_string(),
            Self::DailyGenerated { count } => format!("Generated {count} tasks for today"),
            Self::DefaultsCleared { count } => format!("Removed {count} starter tasks"),
        }
    }
}

pub trait Notifier {
    fn notify(&self, event: &StoreEvent) -> Result<(), AppError>;
}

/// Invoked once each time a toggle moves a task to completed for today.
pub trait Celebrator {
    fn celebrate(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &StoreEvent) -> Result<(), AppError> {
        Ok(())
    }
}

pub struct NoopCelebrator;

impl Celebrator for NoopCelebrator {
    fn celebrate(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn celebrator_from_env() -> Result<Box<dyn Celebrator>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Ok(Box::new(NoopCelebrator));
    }

    match platform_celebrator() {
        Ok(celebrator) => Ok(celebrator),
        Err(err) => match err {
            AppError::InvalidData(_) => Ok(Box::new(NoopCelebrator)),
            other => Err(other),
        },
    }
}

#[cfg(target_os = "linux")]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Ok(Box::new(LinuxCelebrator))
}

#[cfg(windows)]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Ok(Box::new(WindowsCelebrator))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_celebrator() -> Result<Box<dyn Celebrator>, AppError> {
    Err(AppError::invalid_data(
        "desktop notifications are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::StoreEvent;

    #[test]
    fn event_messages_match_toasts() {
        assert_eq!(
            StoreEvent::DailyGenerated { count: 3 }.message(),
            "Generated 3 tasks for today"
        );
        assert_eq!(
            StoreEvent::ScheduleCleared { id: "1".into() }.message(),
            "Task schedule removed"
        );
    }
}
