use std::sync::Arc;

use tokio::sync::mpsc;

use crate::adapters::FFmpegExecAdapter;
use crate::app::config::EditorConfig;
use crate::app::editor_interactor::EditorInteractor;
use crate::engine::{EditorEvent, EventSink};
use crate::error::EditorResult;
use crate::ports::ExecutePort;

/// Wires the execution adapter and event channel into an editor
pub struct DefaultAppContainer {
    config: EditorConfig,
    execute_port: Arc<dyn ExecutePort>,
}

impl DefaultAppContainer {
    /// Container backed by the subprocess adapter
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        let execute_port = Arc::new(FFmpegExecAdapter::from_config(&config));
        Self::with_execute_port(config, execute_port)
    }

    /// Container backed by any execution port
    pub fn with_execute_port(config: EditorConfig, execute_port: Arc<dyn ExecutePort>) -> EditorResult<Self> {
        config.validate()?;
        Ok(Self { config, execute_port })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Build an editor plus the receiving end of its event stream
    pub fn editor(&self) -> (EditorInteractor, mpsc::Receiver<EditorEvent>) {
        let (events, rx) = EventSink::channel(self.config.event_buffer);
        let editor = EditorInteractor::new(
            self.config.clone(),
            Arc::clone(&self.execute_port),
            events,
        );
        (editor, rx)
    }
}
