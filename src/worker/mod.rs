// src/worker/mod.rs
mod processors;

pub use processors::{
    default_processors, EmailProcessor, JobProcessor, NotificationProcessor, ReportProcessor,
};
