//! Execution pipeline tests: batch fan-out, editor orchestration and the
//! shell-backed executor

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;

use reelcut::adapters::FFmpegExecAdapter;
use reelcut::app::{DefaultAppContainer, EditorConfig};
use reelcut::engine::{
    drain_stream, EditorEvent, EventSink, ExecutionReport, ExecutionState, LosslessBatch, MonitorSummary,
    ProgressKey, ProgressMonitor,
};
use reelcut::error::{EditorError, EditorResult};
use reelcut::ports::ExecutePort;
use reelcut::{ProcessingOpts, Query, SplitMode, Timeline, VideoNode};

/// Execute port that never spawns anything. Commands containing
/// `fail_on` exit with status 1; `stderr` is fed to the monitor.
#[derive(Default)]
struct ScriptedExecutor {
    launches: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    fail_on: Option<String>,
    stderr: String,
    commands: std::sync::Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    fn with_stderr(stderr: &str) -> Self {
        Self {
            stderr: stderr.to_string(),
            ..Self::default()
        }
    }

    fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutePort for ScriptedExecutor {
    async fn execute(&self, command: &str, monitor: Option<ProgressMonitor>) -> EditorResult<ExecutionReport> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().unwrap().push(command.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let monitor_summary = drain_stream(self.stderr.as_bytes(), monitor).await;
        let failed = self
            .fail_on
            .as_deref()
            .map(|pattern| command.contains(pattern))
            .unwrap_or(false);

        Ok(ExecutionReport {
            state: if failed {
                ExecutionState::Failed
            } else {
                ExecutionState::Succeeded
            },
            exit_code: Some(if failed { 1 } else { 0 }),
            elapsed: Duration::from_millis(20),
            monitor: MonitorSummary {
                tail: if failed {
                    vec!["Conversion failed!".to_string()]
                } else {
                    monitor_summary.tail.clone()
                },
                ..monitor_summary
            },
        })
    }
}

fn timeline_with_flags(flags: &[bool]) -> Timeline {
    let nodes = flags
        .iter()
        .enumerate()
        .map(|(i, flag)| {
            let mut node = VideoNode::new(format!("src{}.mp4", i), format!("clip{}", i), 0.0, 2.0);
            node.lossless_export = *flag;
            node
        })
        .collect();
    Timeline::from_nodes(nodes)
}

fn cut_opts() -> ProcessingOpts {
    ProcessingOpts {
        output_path: "out".to_string(),
        video_format: ".mp4".to_string(),
        ..ProcessingOpts::default()
    }
}

fn merge_opts() -> ProcessingOpts {
    ProcessingOpts {
        output_path: "out".to_string(),
        ..ProcessingOpts::export_defaults()
    }
}

fn test_config(dir: &TempDir) -> EditorConfig {
    EditorConfig {
        project_dir: dir.path().to_path_buf(),
        max_concurrent_jobs: 2,
        ..EditorConfig::default()
    }
}

fn drain(rx: &mut mpsc::Receiver<EditorEvent>) -> Vec<EditorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// Batch

#[tokio::test]
async fn test_batch_launches_only_flagged_nodes() {
    let executor = Arc::new(ScriptedExecutor::default());
    let batch = LosslessBatch::new(executor.clone(), "ffmpeg", 4);
    let timeline = timeline_with_flags(&[false, true, false, true, false]);

    let summary = batch.run(timeline.nodes(), &cut_opts(), &EventSink::disabled()).await;

    assert_eq!(executor.launches(), 2);
    assert_eq!(summary.launched, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.results.len(), 2);

    let commands = executor.commands.lock().unwrap();
    assert!(commands.iter().any(|c| c.contains("\"out/clip1.mp4\"")));
    assert!(commands.iter().any(|c| c.contains("\"out/clip3.mp4\"")));
}

#[tokio::test]
async fn test_batch_failure_is_isolated() {
    let executor = Arc::new(ScriptedExecutor::failing_on("clip0"));
    let batch = LosslessBatch::new(executor.clone(), "ffmpeg", 4);
    let timeline = timeline_with_flags(&[true, true, true]);
    let (sink, mut rx) = EventSink::channel(16);

    let summary = batch.run(timeline.nodes(), &cut_opts(), &sink).await;

    assert_eq!(summary.launched, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let failed = summary.results.iter().find(|r| !r.is_success()).unwrap();
    assert_eq!(failed.name, "clip0");
    assert!(failed.message.contains("Conversion failed!"));

    let results = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, EditorEvent::OperationResult(_)))
        .count();
    assert_eq!(results, 3);
}

#[tokio::test]
async fn test_batch_respects_concurrency_cap() {
    let executor = Arc::new(ScriptedExecutor::default());
    let batch = LosslessBatch::new(executor.clone(), "ffmpeg", 2);
    let timeline = timeline_with_flags(&[true; 6]);

    let summary = batch.run(timeline.nodes(), &cut_opts(), &EventSink::disabled()).await;

    assert_eq!(summary.launched, 6);
    assert!(executor.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_batch_invalid_node_is_not_launched() {
    let executor = Arc::new(ScriptedExecutor::default());
    let batch = LosslessBatch::new(executor.clone(), "ffmpeg", 2);
    let mut backwards = VideoNode::new("src.mp4", "backwards", 5.0, 1.0);
    backwards.lossless_export = true;
    let mut good = VideoNode::new("src.mp4", "good", 0.0, 1.0);
    good.lossless_export = true;

    let summary = batch.run(&[backwards, good], &cut_opts(), &EventSink::disabled()).await;

    assert_eq!(executor.launches(), 1);
    assert_eq!(summary.launched, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn test_split_pieces_cut_to_distinct_files() {
    let executor = Arc::new(ScriptedExecutor::default());
    let batch = LosslessBatch::new(executor.clone(), "ffmpeg", 4);
    let mut timeline = Timeline::new();
    timeline.insert("src.mp4", "scene", 0.0, 30.0, 0).unwrap();
    timeline.split(SplitMode::IntervalCut, 0, 10.0, 20.0).unwrap();
    timeline.mark_all_lossless().unwrap();

    let summary = batch.run(timeline.nodes(), &cut_opts(), &EventSink::disabled()).await;
    assert_eq!(summary.succeeded, 3);

    let commands = executor.commands.lock().unwrap();
    for output in ["\"out/scene.mp4\"", "\"out/scene_2.mp4\"", "\"out/scene_3.mp4\""] {
        assert_eq!(commands.iter().filter(|c| c.contains(output)).count(), 1, "{}", output);
    }
}

// Editor

#[tokio::test]
async fn test_export_lossless_through_editor() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (mut editor, mut rx) = container.editor();
    editor.load_timeline(timeline_with_flags(&[true, false, true, false, false]));

    let summary = editor.export_lossless(cut_opts()).await.unwrap();
    assert_eq!(summary.launched, 2);
    assert_eq!(executor.launches(), 2);

    drop(editor);
    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&EditorEvent::ExecEnded));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, EditorEvent::OperationResult(_)))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_export_merged_rejects_empty_timeline_without_launching() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (editor, mut rx) = container.editor();

    let err = editor
        .export_merged(merge_opts())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(executor.launches(), 0);

    drop(editor);
    assert_eq!(drain(&mut rx), vec![EditorEvent::ExecEnded]);
}

#[tokio::test]
async fn test_export_merged_reports_progress_and_result() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::with_stderr(
        "frame=10\nout_time_us=2000000\nprogress=continue\nout_time_us=4000000\nprogress=end\n",
    ));
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (mut editor, mut rx) = container.editor();
    editor.load_timeline(Timeline::from_nodes(vec![
        VideoNode::new("a.mp4", "one", 0.0, 4.0),
        VideoNode::new("b.mp4", "two", 0.0, 4.0),
    ]));

    let result = editor.export_merged(merge_opts()).await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.message, "out/output.mp4");

    drop(editor);
    let events = drain(&mut rx);
    assert!(events.contains(&EditorEvent::EncodingProgress { percent: 25 }));
    assert!(events.contains(&EditorEvent::EncodingProgress { percent: 50 }));
    assert!(events.iter().any(|e| matches!(e, EditorEvent::OperationResult(r) if r.is_success())));
    assert_eq!(events.last(), Some(&EditorEvent::ExecEnded));
}

#[tokio::test]
async fn test_export_merged_failure_emits_failed_result() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::failing_on("concat"));
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor).unwrap();
    let (mut editor, mut rx) = container.editor();
    editor.load_timeline(timeline_with_flags(&[false]));

    let err = editor.export_merged(merge_opts()).await.unwrap_err();
    assert!(matches!(err, EditorError::Execution { .. }));

    drop(editor);
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, EditorEvent::OperationResult(r) if !r.is_success())));
    assert_eq!(events.last(), Some(&EditorEvent::ExecEnded));
}

#[tokio::test]
async fn test_probe_duration_reads_banner() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::with_stderr(
        "Input #0, mov,mp4, from 'clip.mp4':\n  Duration: 00:01:02.50, start: 0.000000, bitrate: 1205 kb/s\n",
    ));
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor).unwrap();
    let (editor, mut rx) = container.editor();

    let opts = ProcessingOpts {
        input_path: "media".to_string(),
        filename: "clip".to_string(),
        video_format: ".mp4".to_string(),
        ..ProcessingOpts::default()
    };
    let duration = editor.probe_duration(opts).await.unwrap();
    assert_eq!(duration, Some(62.5));

    drop(editor);
    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![EditorEvent::DurationExtracted { seconds: 62.5 }, EditorEvent::ExecEnded]
    );
}

#[tokio::test]
async fn test_import_source_creates_proxy_in_project() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::with_stderr("out_time=00:00:12.000000\nprogress=end\n"));
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (editor, _rx) = container.editor();

    let video = editor.import_source(std::path::Path::new("/media/holiday.MP4")).await.unwrap();
    assert_eq!(video.name, "holiday");
    assert_eq!(video.extension, ".MP4");
    assert_eq!(video.duration, 12.0);
    assert!(video.filepath.ends_with("holiday.mov"));

    let commands = executor.commands.lock().unwrap();
    assert!(commands[0].contains("-i \"/media/holiday.MP4\" -c copy"));
}

#[tokio::test]
async fn test_import_source_refuses_existing_proxy() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("holiday.mov"), b"proxy").unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (editor, _rx) = container.editor();

    let err = editor
        .import_source(std::path::Path::new("/media/holiday.mp4"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(executor.launches(), 0);
}

#[tokio::test]
async fn test_import_source_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (editor, _rx) = container.editor();

    let err = editor
        .import_source(std::path::Path::new("/media/notes.txt"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(executor.launches(), 0);
}

#[tokio::test]
async fn test_existing_thumbnail_is_reused() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("holiday.png"), b"png").unwrap();
    let executor = Arc::new(ScriptedExecutor::default());
    let container = DefaultAppContainer::with_execute_port(test_config(&dir), executor.clone()).unwrap();
    let (editor, _rx) = container.editor();

    let path = editor
        .generate_thumbnail(std::path::Path::new("/media/holiday.mp4"))
        .await
        .unwrap();
    assert!(path.ends_with("holiday.png"));
    assert_eq!(executor.launches(), 0);
}

// Shell executor

#[cfg(unix)]
mod shell {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let adapter = FFmpegExecAdapter::new("sh");
        let report = adapter.execute("true", None).await.unwrap();
        assert!(report.succeeded());
        assert_eq!(report.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_stderr_tail() {
        let adapter = FFmpegExecAdapter::new("sh");
        let report = adapter
            .execute("echo 'in.mp4: No such file or directory' >&2; exit 1", None)
            .await
            .unwrap();
        assert_eq!(report.state, ExecutionState::Failed);
        assert_eq!(report.exit_code, Some(1));

        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("No such file or directory"));
    }

    #[tokio::test]
    async fn test_progress_lines_become_events() {
        let adapter = FFmpegExecAdapter::new("sh");
        let (sink, mut rx) = EventSink::channel(16);
        let monitor = ProgressMonitor::new(sink, 10.0, &[ProgressKey::OutTimeUs]);

        let report = adapter
            .execute(
                "printf 'out_time_us=5000000\\nprogress=continue\\nout_time_us=10000000\\nprogress=end\\n' >&2",
                Some(monitor),
            )
            .await
            .unwrap();
        assert!(report.succeeded());
        assert_eq!(report.monitor.last_percent, Some(100));

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                EditorEvent::EncodingProgress { percent: 50 },
                EditorEvent::EncodingProgress { percent: 100 },
            ]
        );
    }

    #[tokio::test]
    async fn test_node_names_are_not_evaluated_by_the_shell() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("marker");
        let node = VideoNode::new(
            format!("src`touch {}`.mp4", marker.display()),
            format!("clip$(touch {})", marker.display()),
            0.0,
            2.0,
        );
        let opts = ProcessingOpts {
            output_path: dir.path().to_string_lossy().into_owned(),
            video_format: ".mp4".to_string(),
            ..ProcessingOpts::default()
        };
        let mut command = Query::LosslessCut { node, opts }.build().unwrap();
        command.program = "true".to_string();

        let report = FFmpegExecAdapter::new("sh")
            .execute(&command.render(), None)
            .await
            .unwrap();
        assert!(report.succeeded());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_shell_is_a_launch_error() {
        let adapter = FFmpegExecAdapter::new("/nonexistent/shell");
        let err = adapter.execute("true", None).await.unwrap_err();
        assert!(matches!(err, EditorError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_long_running_command() {
        let adapter = FFmpegExecAdapter::new("sh").with_timeout(Some(Duration::from_millis(200)));
        let err = adapter.execute("sleep 5", None).await.unwrap_err();
        assert!(matches!(err, EditorError::TimedOut { .. }));
    }
}
