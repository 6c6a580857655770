//! Command line of the external muxer joining the downloaded segments.

use std::fmt;
use std::path::Path;

use crate::config::JoinConfig;
use crate::crop::CropPlan;

/// An ffmpeg invocation that concatenates the join playlist into one file,
/// trimmed according to a [`CropPlan`]. Building it does not run anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl JoinCommand {
    pub fn new(
        playlist_path: &Path,
        output_path: &Path,
        crop: &CropPlan,
        config: &JoinConfig,
    ) -> Self {
        let mut args = Vec::new();

        if config.overwrite {
            args.push("-y".to_string());
        }

        args.extend([
            "-i".to_string(),
            playlist_path.to_string_lossy().into_owned(),
        ]);
        args.extend(["-c".to_string(), "copy".to_string()]);

        if let Some(start) = crop.crop_start {
            args.extend(["-ss".to_string(), format!("{start:.3}")]);
        }
        if let Some(duration) = crop.crop_duration {
            args.extend(["-t".to_string(), format!("{duration:.3}")]);
        }

        if config.show_stats {
            args.push("-stats".to_string());
        }
        args.extend(["-loglevel".to_string(), config.loglevel.clone()]);
        args.extend(config.extra_output_options.iter().cloned());
        args.push(output_path.to_string_lossy().into_owned());

        Self {
            program: config.ffmpeg_path.clone(),
            args,
        }
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for JoinCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
