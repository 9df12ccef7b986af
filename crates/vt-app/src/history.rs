use std::sync::Arc;
use chrono::{DateTime, NaiveDateTime};
use log::{info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use vt_core::RecordId;
use crate::backend::TryOnBackend;
use crate::events::{AppEvent, EventSink};
use crate::notifier::Toast;

/// Past results of the configured user, kept on the backend.
#[derive(Clone)]
pub struct HistoryService {
    backend: Arc<dyn TryOnBackend>,
    sink: Arc<dyn EventSink>,
    user_id: Option<i64>,
    runtime: Handle,
}

impl HistoryService {
    pub fn new(backend: Arc<dyn TryOnBackend>, sink: Arc<dyn EventSink>, user_id: Option<i64>, runtime: Handle) -> Self {
        Self { backend, sink, user_id, runtime }
    }

    pub fn is_available(&self) -> bool {
        self.user_id.is_some()
    }

    /// Emits [`AppEvent::HistoryLoaded`] once the list arrives. Needs a user id.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        let Some(user_id) = self.user_id else {
            self.sink.emit(AppEvent::Toast(Toast::info("Set TRYON_USER_ID to see your history")));
            return None;
        };

        let backend = self.backend.clone();
        let sink = self.sink.clone();
        Some(self.runtime.spawn(async move {
            match backend.history(user_id).await {
                Ok(entries) => {
                    info!("Loaded {} history entries for user {}", entries.len(), user_id);
                    sink.emit(AppEvent::HistoryLoaded(entries));
                }
                Err(e) => {
                    warn!("Could not load history: {}", e);
                    sink.emit(AppEvent::Toast(Toast::error(format!("Could not load history: {}", e))));
                }
            }
        }))
    }

    pub fn delete(&self, result_id: RecordId) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let sink = self.sink.clone();

        self.runtime.spawn(async move {
            match backend.delete_history(&result_id).await {
                Ok(()) => {
                    info!("Deleted history entry {}", result_id);
                    sink.emit(AppEvent::HistoryDeleted(result_id));
                    sink.emit(AppEvent::Toast(Toast::success("Result deleted")));
                }
                Err(e) => {
                    warn!("Could not delete history entry {}: {}", result_id, e);
                    sink.emit(AppEvent::Toast(Toast::error(format!("Could not delete result: {}", e))));
                }
            }
        })
    }
}

/// `2025-03-16 23:05` for the timestamps the backend sends; anything else verbatim.
pub fn display_timestamp(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use vt_core::HistoryEntry;
    use crate::backend::fake::FakeBackend;

    fn service(backend: FakeBackend, user_id: Option<i64>) -> (HistoryService, Arc<FakeBackend>, mpsc::Receiver<AppEvent>) {
        let backend = Arc::new(backend);
        let (tx, rx) = mpsc::channel();
        let service = HistoryService::new(backend.clone(), Arc::new(tx), user_id, Handle::current());
        (service, backend, rx)
    }

    #[tokio::test]
    async fn test_refresh_emits_entries() {
        let mut backend = FakeBackend::happy();
        backend.history = vec![HistoryEntry {
            result_id: RecordId::new("3"),
            result_url: "https://cdn.test/3.png".to_string(),
            person_url: None,
            clothing_url: None,
            created_at: Some("2025-03-16T23:05:01".to_string()),
            person_id: None,
            clothing_id: None,
        }];
        let (service, backend, rx) = service(backend, Some(9));

        service.refresh().unwrap().await.unwrap();

        assert_eq!(backend.calls(), vec!["history"]);
        match rx.try_recv().unwrap() {
            AppEvent::HistoryLoaded(entries) => assert_eq!(entries[0].result_id.as_str(), "3"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refresh_needs_user() {
        let (service, backend, rx) = service(FakeBackend::happy(), None);

        assert!(service.refresh().is_none());
        assert!(backend.calls().is_empty());
        assert!(matches!(rx.try_recv().unwrap(), AppEvent::Toast(_)));
    }

    #[tokio::test]
    async fn test_delete_emits_id() {
        let (service, backend, rx) = service(FakeBackend::happy(), Some(9));

        service.delete(RecordId::new("3")).await.unwrap();

        assert_eq!(backend.calls(), vec!["delete"]);
        assert!(matches!(rx.try_recv().unwrap(), AppEvent::HistoryDeleted(id) if id.as_str() == "3"));
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(display_timestamp("2025-03-16T23:05:01"), "2025-03-16 23:05");
        assert_eq!(display_timestamp("2025-03-16 23:05:01.123"), "2025-03-16 23:05");
        assert_eq!(display_timestamp("2025-03-16T23:05:01+02:00"), "2025-03-16 23:05");
        assert_eq!(display_timestamp("yesterday"), "yesterday");
    }
}
