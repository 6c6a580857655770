use serde::{Deserialize, Serialize};

/// Settings of the external muxer that joins the downloaded segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Whether to overwrite the output file if it exists.
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// ffmpeg log level.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Print encoding progress.
    #[serde(default = "default_show_stats")]
    pub show_stats: bool,

    /// Additional options placed right before the output file.
    #[serde(default)]
    pub extra_output_options: Vec<String>,
}

fn default_ffmpeg_path() -> String {
    std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
}

fn default_overwrite() -> bool {
    true
}

fn default_loglevel() -> String {
    "warning".to_string()
}

fn default_show_stats() -> bool {
    true
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            overwrite: default_overwrite(),
            loglevel: default_loglevel(),
            show_stats: default_show_stats(),
            extra_output_options: Vec::new(),
        }
    }
}
