//! Line scanner for the transcoder's error stream

use std::collections::VecDeque;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, trace};

use super::progress::{EditorEvent, EventSink};
use crate::utils::time::TimeParser;

/// Lines of stderr kept for failure messages
const TAIL_LINES: usize = 20;

/// Markers recognized in the progress protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKey {
    /// `out_time_us=<microseconds>`
    OutTimeUs,
    /// `out_time=HH:MM:SS.micro`
    OutTime,
    /// `Duration: HH:MM:SS.ff, ...` from the input banner
    Duration,
}

/// What was learned from one stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorSummary {
    /// Lines read before the stream closed
    pub lines: usize,
    /// Marker lines whose value could not be used
    pub skipped: usize,
    pub last_percent: Option<u8>,
    pub discovered_duration: Option<f64>,
    /// Last lines of the stream, oldest first
    pub tail: Vec<String>,
}

/// Turns progress markers into events. Never decides success or failure.
pub struct ProgressMonitor {
    keys: Vec<ProgressKey>,
    total_duration: f64,
    sink: EventSink,
    parser: TimeParser,
    last_percent: Option<u8>,
    out_time: Option<f64>,
    media_duration: Option<f64>,
    skipped: usize,
}

impl ProgressMonitor {
    /// `total_duration` is the planned length in seconds used for percentages
    pub fn new(sink: EventSink, total_duration: f64, keys: &[ProgressKey]) -> Self {
        Self {
            keys: keys.to_vec(),
            total_duration,
            sink,
            parser: TimeParser::new(),
            last_percent: None,
            out_time: None,
            media_duration: None,
            skipped: 0,
        }
    }

    pub fn watches(&self, key: ProgressKey) -> bool {
        self.keys.contains(&key)
    }

    /// Inspect one line. Returns a progress event when the percentage moved.
    pub fn scan_line(&mut self, line: &str) -> Option<EditorEvent> {
        let line = line.trim();

        if self.watches(ProgressKey::Duration) {
            if let Some(rest) = line.strip_prefix("Duration:") {
                self.record_media_duration(rest);
                return None;
            }
        }

        let (key, value) = line.split_once('=')?;
        match key.trim() {
            "out_time_us" if self.watches(ProgressKey::OutTimeUs) => self.record_out_time_us(value.trim()),
            "out_time" if self.watches(ProgressKey::OutTime) => {
                match self.parser.parse_hms(value) {
                    Ok(seconds) => self.out_time = Some(seconds),
                    Err(err) => self.skip(line, &err.to_string()),
                }
                None
            }
            _ => None,
        }
    }

    /// Last `out_time` seen, or else the first `Duration:` value
    pub fn discovered_duration(&self) -> Option<f64> {
        self.out_time.or(self.media_duration)
    }

    fn record_out_time_us(&mut self, value: &str) -> Option<EditorEvent> {
        let micros = match value.parse::<i64>() {
            Ok(micros) if micros >= 0 => micros,
            Ok(_) => {
                self.skip(value, "negative time counter");
                return None;
            }
            Err(err) => {
                self.skip(value, &err.to_string());
                return None;
            }
        };
        if self.total_duration <= 0.0 {
            return None;
        }

        let seconds = (micros / 1_000_000) as f64;
        let percent = (seconds * 100.0 / self.total_duration).floor().clamp(0.0, 100.0) as u8;
        if self.last_percent == Some(percent) {
            return None;
        }
        self.last_percent = Some(percent);
        Some(EditorEvent::EncodingProgress { percent })
    }

    fn record_media_duration(&mut self, rest: &str) {
        if self.media_duration.is_some() {
            return;
        }
        let text = rest.split(',').next().unwrap_or_default();
        match self.parser.parse_hms(text) {
            Ok(seconds) => self.media_duration = Some(seconds),
            Err(err) => self.skip(text, &err.to_string()),
        }
    }

    fn skip(&mut self, input: &str, reason: &str) {
        self.skipped += 1;
        trace!(input, reason, "Skipping unparsable progress value");
    }

    /// Emit the discovered duration, if any, and summarize
    async fn finish(self, lines: usize, tail: Vec<String>) -> MonitorSummary {
        let discovered_duration = self.discovered_duration();
        if let Some(seconds) = discovered_duration {
            self.sink.emit(EditorEvent::DurationExtracted { seconds }).await;
        }
        MonitorSummary {
            lines,
            skipped: self.skipped,
            last_percent: self.last_percent,
            discovered_duration,
            tail,
        }
    }
}

/// Read `stream` line by line until it closes, feeding the monitor if any.
///
/// The stream is always drained so the child never blocks on a full pipe.
pub async fn drain_stream<R>(stream: R, mut monitor: Option<ProgressMonitor>) -> MonitorSummary
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
    let mut count = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                count += 1;
                if let Some(monitor) = monitor.as_mut() {
                    if let Some(event) = monitor.scan_line(&line) {
                        monitor.sink.emit(event).await;
                    }
                }
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "Stopped reading transcoder output");
                break;
            }
        }
    }

    let tail: Vec<String> = tail.into_iter().collect();
    match monitor {
        Some(monitor) => monitor.finish(count, tail).await,
        None => MonitorSummary {
            lines: count,
            tail,
            ..MonitorSummary::default()
        },
    }
}
