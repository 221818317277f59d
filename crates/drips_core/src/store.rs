use crate::clock::{Clock, SystemClock};
use crate::logbook::{LogbookDay, build_logbook};
use crate::model::{CompletionRecord, DailyTask, Direction, SortOption, Task};
use crate::notify::{Celebrator, NoopCelebrator, NoopNotifier, Notifier, StoreEvent};
use crate::seed::{default_tasks, is_default_task_id};
use crate::storage::json_store::{decode_bank, decode_daily, encode_bank, encode_daily};
use crate::storage::{BANK_KEY, KeyValueStore, daily_key};
use crate::task_utils::{is_task_completed_today, select_daily, sort_tasks};
use crate::time_util::today_key;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Owns the task bank and the current day's selection.
///
/// Every mutation applies fully in memory, then writes the affected record
/// through the injected [`KeyValueStore`], then reports a [`StoreEvent`].
/// Write failures are logged and otherwise ignored; the in-memory state stays
/// authoritative for the rest of the session.
pub struct TaskStore {
    tasks: Vec<Task>,
    daily: Vec<DailyTask>,
    daily_date: String,
    persist: bool,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
    notifier: Box<dyn Notifier>,
    celebrator: Box<dyn Celebrator>,
}

pub struct TaskStoreBuilder {
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    rng: Option<Box<dyn RngCore>>,
    notifier: Box<dyn Notifier>,
    celebrator: Box<dyn Celebrator>,
    seed_starter_tasks: bool,
}

impl TaskStoreBuilder {
    pub fn clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn celebrator(mut self, celebrator: Box<dyn Celebrator>) -> Self {
        self.celebrator = celebrator;
        self
    }

    pub fn seed_starter_tasks(mut self, seed: bool) -> Self {
        self.seed_starter_tasks = seed;
        self
    }

    pub fn open(self) -> TaskStore {
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_entropy()));
        let mut store = TaskStore {
            tasks: Vec::new(),
            daily: Vec::new(),
            daily_date: String::new(),
            persist: true,
            storage: self.storage,
            clock: self.clock,
            rng,
            notifier: self.notifier,
            celebrator: self.celebrator,
        };
        store.load_bank(self.seed_starter_tasks);
        store.roll_over();
        store
    }
}

impl TaskStore {
    pub fn builder(storage: Box<dyn KeyValueStore>) -> TaskStoreBuilder {
        TaskStoreBuilder {
            storage,
            clock: Box::new(SystemClock),
            rng: None,
            notifier: Box::new(NoopNotifier),
            celebrator: Box::new(NoopCelebrator),
            seed_starter_tasks: true,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The selection for the day it was loaded for. Call [`Self::roll_over`]
    /// first when the session may have crossed midnight.
    pub fn daily_tasks(&self) -> &[DailyTask] {
        &self.daily
    }

    pub fn today_key(&self) -> String {
        today_key(self.clock.as_ref())
    }

    pub fn is_completed_today(&self, task: &Task) -> bool {
        is_task_completed_today(task, &self.today_key())
    }

    pub fn has_default_tasks(&self) -> bool {
        self.tasks.iter().any(|task| is_default_task_id(&task.id))
    }

    pub fn sorted_tasks(&self, option: SortOption) -> Vec<Task> {
        sort_tasks(&self.tasks, option)
    }

    pub fn logbook(&self) -> Vec<LogbookDay> {
        build_logbook(&self.tasks)
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persist
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn into_storage(self) -> Box<dyn KeyValueStore> {
        self.storage
    }

    /// Switches to the selection stored for today when the date has changed
    /// since the current selection was loaded. Returns whether it switched.
    pub fn roll_over(&mut self) -> bool {
        let today = self.today_key();
        if today == self.daily_date {
            return false;
        }

        if !self.daily_date.is_empty() {
            info!(from = %self.daily_date, to = %today, "day changed, loading daily selection");
        }
        self.daily = self.load_daily(&today);
        self.daily_date = today;
        true
    }

    pub fn add_task(&mut self, title: &str) -> Task {
        self.roll_over();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            completions: Vec::new(),
            created_at: self.clock.now(),
            scheduled_time: None,
        };
        debug!(id = %task.id, "adding task");

        self.tasks.push(task.clone());
        self.save_bank();
        self.emit(StoreEvent::TaskAdded {
            id: task.id.clone(),
            title: task.title.clone(),
        });
        task
    }

    /// Removes the task from the bank and today's selection. Unknown ids are
    /// a no-op.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        self.roll_over();
        let from_bank = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .map(|index| self.tasks.remove(index));
        let from_daily = self
            .daily
            .iter()
            .position(|entry| entry.task.id == id)
            .map(|index| self.daily.remove(index));

        if from_bank.is_none() && from_daily.is_none() {
            debug!(id, "delete ignored, task not found");
            return None;
        }

        if from_bank.is_some() {
            self.save_bank();
        }
        if from_daily.is_some() {
            renumber(&mut self.daily);
            self.save_daily();
        }

        let removed = from_bank.or_else(|| from_daily.map(|entry| entry.task))?;
        debug!(id, "deleted task");
        self.emit(StoreEvent::TaskRemoved {
            id: removed.id.clone(),
            title: removed.title.clone(),
        });
        Some(removed)
    }

    /// Flips today's completion on the bank copy and the daily copy
    /// independently. Returns the new state, preferring the bank copy, or
    /// `None` when the id is in neither collection.
    pub fn toggle_task_completion(&mut self, id: &str) -> Option<bool> {
        self.roll_over();
        let today = self.daily_date.clone();
        let now = self.clock.now();
        let mut bank_state = None;
        let mut daily_state = None;
        let mut completed_task = None;

        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            let completed = toggle_record(task, &today, now);
            if completed {
                completed_task = Some(task.clone());
            }
            bank_state = Some(completed);
        }

        if let Some(entry) = self.daily.iter_mut().find(|entry| entry.task.id == id) {
            let completed = toggle_record(&mut entry.task, &today, now);
            if completed && completed_task.is_none() {
                completed_task = Some(entry.task.clone());
            }
            daily_state = Some(completed);
        }

        if bank_state.is_some() {
            self.save_bank();
        }
        if daily_state.is_some() {
            self.save_daily();
        }

        let state = bank_state.or(daily_state);
        match state {
            Some(completed) => debug!(id, completed, date = %today, "toggled completion"),
            None => debug!(id, "toggle ignored, task not found"),
        }

        if let Some(task) = completed_task {
            self.emit(StoreEvent::TaskCompleted {
                id: task.id.clone(),
                title: task.title.clone(),
            });
            if let Err(err) = self.celebrator.celebrate(&task) {
                warn!(error = %err, id = %task.id, "celebration failed");
            }
        }

        state
    }

    /// Replaces today's selection with a fresh random draw of up to `count`
    /// bank tasks.
    pub fn generate_daily_tasks(&mut self, count: usize) -> &[DailyTask] {
        self.roll_over();
        self.daily = select_daily(&self.tasks, count, self.rng.as_mut());
        info!(
            requested = count,
            selected = self.daily.len(),
            date = %self.daily_date,
            "generated daily selection"
        );

        self.save_daily();
        self.emit(StoreEvent::DailyGenerated {
            count: self.daily.len(),
        });
        &self.daily
    }

    /// Swaps the entry with its neighbour. Returns `false` at the edges or for
    /// an unknown id.
    pub fn reorder_daily_task(&mut self, id: &str, direction: Direction) -> bool {
        self.roll_over();
        let Some(index) = self.daily.iter().position(|entry| entry.task.id == id) else {
            return false;
        };
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => (index + 1 < self.daily.len()).then_some(index + 1),
        };
        let Some(target) = target else {
            return false;
        };

        self.daily.swap(index, target);
        renumber(&mut self.daily);
        debug!(id, from = index, to = target, "reordered daily task");
        self.save_daily();
        true
    }

    /// Sets or clears the time of day on both copies. `time` is expected in
    /// normalized `HH:MM` form.
    pub fn schedule_task(&mut self, id: &str, time: Option<&str>) -> bool {
        self.roll_over();
        let scheduled = time.map(str::to_string);
        let mut in_bank = false;
        let mut in_daily = false;

        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            task.scheduled_time = scheduled.clone();
            in_bank = true;
        }
        if let Some(entry) = self.daily.iter_mut().find(|entry| entry.task.id == id) {
            entry.task.scheduled_time = scheduled.clone();
            in_daily = true;
        }

        if !in_bank && !in_daily {
            debug!(id, "schedule ignored, task not found");
            return false;
        }
        if in_bank {
            self.save_bank();
        }
        if in_daily {
            self.save_daily();
        }

        let event = match scheduled {
            Some(time) => StoreEvent::ScheduleSet {
                id: id.to_string(),
                time,
            },
            None => StoreEvent::ScheduleCleared { id: id.to_string() },
        };
        self.emit(event);
        true
    }

    /// Deletes every starter task. Returns how many left the bank.
    pub fn clear_default_tasks(&mut self) -> usize {
        self.roll_over();
        let bank_before = self.tasks.len();
        let daily_before = self.daily.len();
        self.tasks.retain(|task| !is_default_task_id(&task.id));
        self.daily.retain(|entry| !is_default_task_id(&entry.task.id));
        let removed = bank_before - self.tasks.len();

        if removed > 0 {
            self.save_bank();
        }
        if self.daily.len() != daily_before {
            renumber(&mut self.daily);
            self.save_daily();
        }

        info!(removed, "cleared starter tasks");
        self.emit(StoreEvent::DefaultsCleared { count: removed });
        removed
    }

    fn load_bank(&mut self, seed_starter_tasks: bool) {
        match self.storage.read(BANK_KEY) {
            Ok(Some(content)) => match decode_bank(&content) {
                Ok(tasks) => self.tasks = tasks,
                Err(err) => {
                    warn!(error = %err, "task bank is unreadable, continuing in memory only");
                    self.persist = false;
                }
            },
            Ok(None) if seed_starter_tasks => {
                self.tasks = default_tasks(self.clock.now());
                info!(count = self.tasks.len(), "seeded starter tasks");
                self.save_bank();
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "failed to read task bank, continuing in memory only");
                self.persist = false;
            }
        }
    }

    fn load_daily(&mut self, date_key: &str) -> Vec<DailyTask> {
        let key = daily_key(date_key);
        match self.storage.read(&key) {
            Ok(Some(content)) => match decode_daily(&content) {
                Ok(daily) => daily,
                Err(err) => {
                    warn!(error = %err, key = %key, "daily selection is unreadable, continuing in memory only");
                    self.persist = false;
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, key = %key, "failed to read daily selection, continuing in memory only");
                self.persist = false;
                Vec::new()
            }
        }
    }

    fn save_bank(&mut self) {
        if !self.persist {
            return;
        }
        let result = encode_bank(&self.tasks)
            .and_then(|content| self.storage.write(BANK_KEY, &content));
        if let Err(err) = result {
            warn!(error = %err, "failed to persist task bank");
        }
    }

    fn save_daily(&mut self) {
        if !self.persist {
            return;
        }
        let key = daily_key(&self.daily_date);
        let result = encode_daily(&self.daily)
            .and_then(|content| self.storage.write(&key, &content));
        if let Err(err) = result {
            warn!(error = %err, key = %key, "failed to persist daily selection");
        }
    }

    fn emit(&self, event: StoreEvent) {
        if let Err(err) = self.notifier.notify(&event) {
            warn!(error = %err, ?event, "notifier failed");
        }
    }
}

fn toggle_record(task: &mut Task, today: &str, now: OffsetDateTime) -> bool {
    match task.completion_for_mut(today) {
        Some(record) => {
            record.completed = !record.completed;
            record.timestamp = now;
            record.completed
        }
        None => {
            task.completions.push(CompletionRecord {
                date: today.to_string(),
                completed: true,
                timestamp: now,
            });
            true
        }
    }
}

fn renumber(daily: &mut [DailyTask]) {
    for (order, entry) in daily.iter_mut().enumerate() {
        entry.order = order;
    }
}
