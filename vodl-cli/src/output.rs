use crate::{cli::OutputFormat, error::Result};
use colored::*;
use serde::Serialize;
use std::borrow::Cow;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};
use vodl_engine::{CropPlan, DownloadTarget, JoinCommand, Rendition};

/// Everything `vodl plan` decided, ready to be printed.
#[derive(Debug, Serialize)]
pub struct PlanReport<'a> {
    pub rendition: &'a Rendition,
    pub media_url: String,
    pub segments: Vec<DownloadTarget>,
    pub init_sections: Vec<DownloadTarget>,
    pub total_duration: f64,
    pub crop_start: Option<f64>,
    pub crop_duration: Option<f64>,
    pub playlist_path: PathBuf,
    #[serde(serialize_with = "serialize_command")]
    pub join_command: &'a JoinCommand,
}

impl<'a> PlanReport<'a> {
    pub fn new(
        rendition: &'a Rendition,
        media_url: String,
        plan: &CropPlan,
        join_command: &'a JoinCommand,
    ) -> Self {
        Self {
            rendition,
            media_url,
            segments: Vec::new(),
            init_sections: Vec::new(),
            total_duration: plan.total_duration(),
            crop_start: plan.crop_start,
            crop_duration: plan.crop_duration,
            playlist_path: PathBuf::new(),
            join_command,
        }
    }
}

fn serialize_command<S: serde::Serializer>(
    command: &&JoinCommand,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    command.argv().serialize(serializer)
}

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_renditions(
        &self,
        renditions: &[&Rendition],
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_rendition_table(renditions)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(renditions)?),
        }
    }

    pub fn format_plan(&self, report: &PlanReport<'_>, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_plan_pretty(report)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    fn format_rendition_table(&self, renditions: &[&Rendition]) -> String {
        #[derive(Tabled)]
        struct RenditionRow<'a> {
            #[tabled(rename = "#")]
            number: usize,
            #[tabled(rename = "Name")]
            name: Cow<'a, str>,
            #[tabled(rename = "Group ID")]
            group_id: &'a str,
            #[tabled(rename = "Resolution")]
            resolution: &'a str,
        }

        let rows = renditions.iter().enumerate().map(|(idx, rendition)| {
            let name = if rendition.is_source {
                Cow::Owned(format!("{} (source)", rendition.name))
            } else {
                Cow::Borrowed(rendition.name.as_str())
            };
            RenditionRow {
                number: idx + 1,
                name,
                group_id: &rendition.group_id,
                resolution: rendition.resolution.as_deref().unwrap_or("-"),
            }
        });

        Table::new(rows).with(Style::modern()).to_string()
    }

    fn format_plan_pretty(&self, report: &PlanReport<'_>) -> String {
        let mut output = String::new();
        output.push_str(&self.colorize("Download Plan:", Color::Green, true));
        output.push('\n');

        self.push_field(&mut output, "Quality", &report.rendition.name);
        self.push_field(&mut output, "Media Playlist", &report.media_url);
        self.push_field(
            &mut output,
            "Segments",
            &format!("{} ({:.3}s)", report.segments.len(), report.total_duration),
        );
        if !report.init_sections.is_empty() {
            self.push_field(
                &mut output,
                "Init Sections",
                &report.init_sections.len().to_string(),
            );
        }
        if let Some(start) = report.crop_start {
            self.push_field(&mut output, "Crop Start", &format!("{start:.3}s"));
        }
        if let Some(duration) = report.crop_duration {
            self.push_field(&mut output, "Crop Duration", &format!("{duration:.3}s"));
        }
        self.push_field(
            &mut output,
            "Join Playlist",
            &report.playlist_path.display().to_string(),
        );
        self.push_field(&mut output, "Join Command", &report.join_command.to_string());

        output.push_str(&format!(
            "\n{}\n",
            self.colorize("Downloads:", Color::Green, true)
        ));
        for target in report.init_sections.iter().chain(&report.segments) {
            output.push_str(&format!(
                "  {} -> {}\n",
                self.colorize(&target.url, Color::Blue, false),
                target.path.display()
            ));
        }
        output
    }

    fn push_field(&self, output: &mut String, label: &str, value: &str) {
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(label, Color::Yellow, false),
            self.colorize(value, Color::Cyan, false)
        ));
    }

    fn colorize(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        let colored_text = text.color(color);
        if bold {
            colored_text.bold().to_string()
        } else {
            colored_text.to_string()
        }
    }
}
