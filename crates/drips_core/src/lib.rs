pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod logbook;
pub mod model;
pub mod notify;
pub mod seed;
pub mod storage;
pub mod store;
pub mod task_utils;
pub mod time_util;

pub use store::{TaskStore, TaskStoreBuilder};
