// src/worker/processors.rs
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// A queue consumer owned by the worker role.
///
/// Processing is stubbed: the scheduling API does not publish jobs yet,
/// so each processor only acknowledges its payload.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    fn queue(&self) -> &'static str;

    async fn process(&self, payload: Value) -> anyhow::Result<()>;
}

pub struct EmailProcessor;

#[async_trait]
impl JobProcessor for EmailProcessor {
    fn queue(&self) -> &'static str {
        "email"
    }

    async fn process(&self, payload: Value) -> anyhow::Result<()> {
        info!(queue = self.queue(), "Acknowledged email job: {}", payload);
        Ok(())
    }
}

pub struct NotificationProcessor;

#[async_trait]
impl JobProcessor for NotificationProcessor {
    fn queue(&self) -> &'static str {
        "notifications"
    }

    async fn process(&self, payload: Value) -> anyhow::Result<()> {
        info!(queue = self.queue(), "Acknowledged notification job: {}", payload);
        Ok(())
    }
}

pub struct ReportProcessor;

#[async_trait]
impl JobProcessor for ReportProcessor {
    fn queue(&self) -> &'static str {
        "reports"
    }

    async fn process(&self, payload: Value) -> anyhow::Result<()> {
        info!(queue = self.queue(), "Acknowledged report job: {}", payload);
        Ok(())
    }
}

pub fn default_processors() -> Vec<Arc<dyn JobProcessor>> {
    vec![
        Arc::new(EmailProcessor),
        Arc::new(NotificationProcessor),
        Arc::new(ReportProcessor),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn every_stub_processor_acknowledges_its_payload() {
        for processor in default_processors() {
            assert!(!processor.queue().is_empty());
            assert!(processor.process(json!({ "id": 1 })).await.is_ok());
        }
    }

    #[test]
    fn queues_are_distinct() {
        let processors = default_processors();
        let mut queues: Vec<_> = processors.iter().map(|p| p.queue()).collect();
        queues.sort_unstable();
        queues.dedup();

        assert_eq!(queues.len(), processors.len());
    }
}
