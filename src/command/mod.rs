//! Transcoder command construction
//!
//! A [`TranscoderCommand`] is plain data: callers fill in the fields they
//! need (struct-update syntax over `Default` works well) and call
//! [`TranscoderCommand::render`] once. The rendered flag order is fixed and
//! a flag is only emitted when its field differs from the default, so two
//! commands with the same state always render the same string.

mod filter;

pub use filter::{concat_filter, input_indices, ConcatFilter, CONCAT_OUTPUT_LABEL};

/// Default transcoder binary
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// Options placed before the first input
#[derive(Debug, Clone, PartialEq)]
pub struct PreInputParams {
    /// Emit `-hide_banner`
    pub hide_banner: bool,
    /// Log verbosity passed to `-v`
    pub verbosity: String,
    /// Interval for `-stats_period`
    pub stats_period: String,
    /// Sink for machine-readable progress (`-progress`)
    pub progress: String,
    /// Input seek offset in seconds (`-ss`)
    pub start_time: f64,
}

impl Default for PreInputParams {
    fn default() -> Self {
        Self {
            hide_banner: true,
            verbosity: "quiet".to_string(),
            stats_period: "5s".to_string(),
            progress: "pipe:2".to_string(),
            start_time: 0.0,
        }
    }
}

/// Parameters shared by the filter-graph fragments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraphParams {
    /// Target size used by `scale` stages
    pub scale: String,
}

/// Options applied to the outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputParams {
    /// `-t`, seconds
    pub duration: f64,
    /// `-to`, seconds
    pub stop_time: f64,
    /// `-avoid_negative_ts`
    pub avoid_negative_ts: String,
    /// `-c`
    pub codec: String,
    /// `-c:v`
    pub video_codec: String,
    /// `-c:a`
    pub audio_codec: String,
    /// `-movflags`
    pub movflags: String,
    /// `-crf`
    pub crf: String,
    /// `-preset`
    pub preset: String,
    /// `-copyts`
    pub copy_ts: bool,
    /// `-frames:v`
    pub video_frames: u32,
    /// `-s`
    pub scale: String,
    /// `-f`
    pub format: String,
}

/// Full state of one transcoder invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TranscoderCommand {
    pub program: String,
    pub pre_input: PreInputParams,
    /// Input paths in insertion order; duplicates are skipped on render
    pub inputs: Vec<String>,
    pub filter_params: FilterGraphParams,
    /// Raw filter-graph fragments, joined with `;`
    pub filter_graph: Vec<String>,
    /// Filter output labels routed to the outputs
    pub maps: Vec<String>,
    pub output: OutputParams,
    pub outputs: Vec<String>,
}

impl Default for TranscoderCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            pre_input: PreInputParams::default(),
            inputs: Vec::new(),
            filter_params: FilterGraphParams::default(),
            filter_graph: Vec::new(),
            maps: Vec::new(),
            output: OutputParams::default(),
            outputs: Vec::new(),
        }
    }
}

impl TranscoderCommand {
    /// Inputs with later duplicates removed; the first occurrence wins
    pub fn distinct_inputs(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !seen.contains(&input.as_str()) {
                seen.push(input);
            }
        }
        seen
    }

    /// Render the shell command line. Every token is followed by a space,
    /// including the last one.
    pub fn render(&self) -> String {
        let mut line = format!("{} ", self.program);
        self.render_pre_input(&mut line);

        for input in self.distinct_inputs() {
            line.push_str(&format!("-i {} ", quote(input)));
        }

        if !self.filter_graph.is_empty() {
            line.push_str(&format!("-filter_complex {} ", quote(&self.filter_graph.join(";"))));
        }
        for label in &self.maps {
            line.push_str(&format!("-map {} ", quote(label)));
        }

        self.render_output(&mut line);

        for output in &self.outputs {
            line.push_str(&format!("{} ", quote(output)));
        }
        line
    }

    fn render_pre_input(&self, line: &mut String) {
        let pre = &self.pre_input;
        if pre.hide_banner {
            line.push_str("-hide_banner ");
        }
        push_text(line, "-v", &pre.verbosity);
        push_text(line, "-stats_period", &pre.stats_period);
        push_text(line, "-progress", &pre.progress);
        push_seconds(line, "-ss", pre.start_time);
    }

    fn render_output(&self, line: &mut String) {
        let out = &self.output;
        push_seconds(line, "-t", out.duration);
        push_seconds(line, "-to", out.stop_time);
        push_text(line, "-avoid_negative_ts", &out.avoid_negative_ts);
        push_text(line, "-c", &out.codec);
        push_text(line, "-c:v", &out.video_codec);
        push_text(line, "-c:a", &out.audio_codec);
        if !out.movflags.is_empty() {
            line.push_str(&format!("-movflags '{}' ", out.movflags));
        }
        push_text(line, "-crf", &out.crf);
        push_text(line, "-preset", &out.preset);
        if out.copy_ts {
            line.push_str("-copyts ");
        }
        if out.video_frames != 0 {
            line.push_str(&format!("-frames:v {} ", out.video_frames));
        }
        push_text(line, "-s", &out.scale);
        push_text(line, "-f", &out.format);
    }
}

impl std::fmt::Display for TranscoderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Wrap `value` in double quotes for `sh -c`, escaping the characters the
/// shell still interprets there
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn push_text(line: &mut String, flag: &str, value: &str) {
    if !value.is_empty() {
        line.push_str(&format!("{} {} ", flag, value));
    }
}

fn push_seconds(line: &mut String, flag: &str, seconds: f64) {
    if seconds != 0.0 {
        line.push_str(&format!("{} {:.4} ", flag, seconds));
    }
}
