//! Outward events and the sink that carries them to the presentation layer

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::model::ProcessingResult;

/// Events produced while queries run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Share of the planned timeline duration encoded so far, 0..=100
    EncodingProgress { percent: u8 },
    /// Media duration read from the transcoder output, in seconds
    DurationExtracted { seconds: f64 },
    /// Outcome of one operation or one batch item
    #[serde(rename = "result")]
    OperationResult(ProcessingResult),
    /// Emitted once per top-level operation, whatever the outcome
    ExecEnded,
}

/// Many-producer handle onto the single event consumer.
///
/// Cloned into every monitor and batch worker for the lifetime of one
/// operation. A sink built with [`EventSink::disabled`] drops everything.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<EditorEvent>>,
}

impl EventSink {
    /// Bounded sink plus the receiving end for the consumer
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EditorEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Deliver an event, waiting for room in the channel. A closed consumer
    /// is not an error; the event is dropped.
    pub async fn emit(&self, event: EditorEvent) {
        if let Some(tx) = &self.tx {
            if let Err(err) = tx.send(event).await {
                trace!(event = ?err.0, "Event consumer gone, dropping event");
            }
        }
    }
}

/// Consumer that writes each event as one JSON line on stdout
pub struct JsonEventPrinter {
    include_progress: bool,
}

impl JsonEventPrinter {
    pub fn new(include_progress: bool) -> Self {
        Self { include_progress }
    }

    /// Encode one event, stamped with the current UTC time
    pub fn format(&self, event: &EditorEvent) -> Option<String> {
        if !self.include_progress && matches!(event, EditorEvent::EncodingProgress { .. }) {
            return None;
        }

        let mut value = serde_json::to_value(event).ok()?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        Some(value.to_string())
    }

    /// Print until every sender is dropped; returns how many events arrived
    pub async fn run(self, mut rx: mpsc::Receiver<EditorEvent>) -> usize {
        let mut received = 0;
        while let Some(event) = rx.recv().await {
            received += 1;
            if let Some(line) = self.format(&event) {
                println!("{}", line);
            }
        }
        received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let progress = serde_json::to_value(EditorEvent::EncodingProgress { percent: 42 }).unwrap();
        assert_eq!(progress["event"], "encoding_progress");
        assert_eq!(progress["percent"], 42);

        let result = serde_json::to_value(EditorEvent::OperationResult(ProcessingResult::success(
            "n1", "clip", "out/clip.mp4",
        )))
        .unwrap();
        assert_eq!(result["event"], "result");
        assert_eq!(result["status"], "success");
        assert_eq!(result["message"], "out/clip.mp4");

        let ended = serde_json::to_value(EditorEvent::ExecEnded).unwrap();
        assert_eq!(ended["event"], "exec_ended");
    }

    #[test]
    fn test_printer_filters_progress() {
        let quiet = JsonEventPrinter::new(false);
        assert!(quiet.format(&EditorEvent::EncodingProgress { percent: 3 }).is_none());

        let line = quiet.format(&EditorEvent::DurationExtracted { seconds: 1.5 }).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["seconds"], 1.5);
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_sink_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel(8);
        sink.emit(EditorEvent::EncodingProgress { percent: 10 }).await;
        sink.clone().emit(EditorEvent::ExecEnded).await;
        drop(sink);

        assert_eq!(rx.recv().await, Some(EditorEvent::EncodingProgress { percent: 10 }));
        assert_eq!(rx.recv().await, Some(EditorEvent::ExecEnded));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_disabled_sink_and_closed_consumer() {
        EventSink::disabled().emit(EditorEvent::ExecEnded).await;

        let (sink, rx) = EventSink::channel(1);
        drop(rx);
        sink.emit(EditorEvent::ExecEnded).await;
    }
}
