use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{AppError, Result},
    output::{OutputManager, PlanReport},
    prompt::PromptChooser,
    time::parse_range,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;
use vodl_engine::{
    DefaultChooser, JoinCommand, MediaPlaylist, Rendition, download_targets, enumerate_vods,
    filter_vods, get_init_sections, init_section_targets, make_join_playlist, parse_media_playlist,
    parse_renditions, render_playlist, segment_targets, select_rendition, sorted_renditions,
};

/// Arguments of `vodl plan`, as given on the command line.
#[derive(Debug, Default)]
pub struct PlanRequest {
    pub master: PathBuf,
    pub media: Option<PathBuf>,
    pub quality: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub target: PathBuf,
    pub output: Option<OutputFormat>,
    pub no_prompt: bool,
}

pub struct CommandExecutor {
    config: AppConfig,
    output_manager: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, colored: bool) -> Self {
        Self {
            config,
            output_manager: OutputManager::new(colored),
        }
    }

    pub async fn list_renditions(
        &self,
        master: &Path,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let renditions = read_renditions(master).await?;
        let sorted = sorted_renditions(&renditions);
        let format = format.unwrap_or(self.config.output_format);
        println!("{}", self.output_manager.format_renditions(&sorted, format)?);
        Ok(())
    }

    /// Selects a rendition, crops its segments to the requested range, writes
    /// the join playlist and prints what has to be downloaded.
    pub async fn plan(&self, request: PlanRequest) -> Result<()> {
        let (start, end) = parse_range(request.start.as_deref(), request.end.as_deref())?;
        let renditions = read_renditions(&request.master).await?;

        let quality = request
            .quality
            .as_deref()
            .or(self.config.default_quality.as_deref());
        let rendition = if request.no_prompt {
            select_rendition(&renditions, quality, &mut DefaultChooser)?
        } else {
            select_rendition(&renditions, quality, &mut PromptChooser)?
        };
        info!("Selected quality {} ({})", rendition.name, rendition.group_id);

        let (media, media_location) =
            read_media_playlist(&request.master, request.media.as_deref(), rendition).await?;
        let base_url = match request.base_url.as_deref() {
            Some(base) => Url::parse(base)
                .map_err(|e| AppError::InvalidInput(format!("invalid base URL '{base}': {e}")))?,
            None => media_location,
        };
        debug!("Resolving segments against {base_url}");

        let vods = enumerate_vods(&media)?;
        let plan = filter_vods(&vods, start, end);
        if plan.vods.is_empty() {
            return Err(AppError::InvalidInput(
                "no segments fall inside the requested range".to_string(),
            ));
        }
        info!(
            "Keeping {} of {} segments ({:.3}s)",
            plan.vods.len(),
            vods.len(),
            plan.total_duration()
        );

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.output_dir.clone());
        let local_paths = segment_targets(&plan.vods, &output_dir);
        let join_playlist = make_join_playlist(&media, &plan.vods, &local_paths)?;

        tokio::fs::create_dir_all(&output_dir).await?;
        let playlist_path = output_dir.join(&self.config.playlist_name);
        tokio::fs::write(&playlist_path, render_playlist(&join_playlist)?).await?;
        info!("Wrote join playlist to {}", playlist_path.display());

        let join_command =
            JoinCommand::new(&playlist_path, &request.target, &plan, &self.config.join);

        let mut report = PlanReport::new(rendition, base_url.to_string(), &plan, &join_command);
        report.segments = download_targets(&base_url, &plan.vods, &output_dir)?;
        report.init_sections =
            init_section_targets(&base_url, &get_init_sections(&media), &output_dir)?;
        report.playlist_path = playlist_path;

        let format = request.output.unwrap_or(self.config.output_format);
        println!("{}", self.output_manager.format_plan(&report, format)?);
        Ok(())
    }
}

async fn read_renditions(master: &Path) -> Result<Vec<Rendition>> {
    let text = tokio::fs::read_to_string(master).await?;
    let renditions = parse_renditions(&text)?;
    debug!(
        "Found {} renditions in {}",
        renditions.len(),
        master.display()
    );
    Ok(renditions)
}

/// Reads the media playlist of `rendition` and returns it with the URL its
/// segment paths are relative to.
///
/// An explicit `media` file wins. Otherwise the rendition URL must be a path
/// relative to the master playlist, since nothing here fetches remote files.
async fn read_media_playlist(
    master: &Path,
    media: Option<&Path>,
    rendition: &Rendition,
) -> Result<(MediaPlaylist, Url)> {
    let remote = Url::parse(&rendition.url).ok();

    let path = match (media, &remote) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(url)) if url.scheme() == "file" => url.to_file_path().map_err(|()| {
            AppError::InvalidInput(format!("{url} does not name a local file"))
        })?,
        (None, Some(url)) => {
            return Err(AppError::InvalidInput(format!(
                "media playlist {url} is remote, download it and pass --media"
            )));
        }
        (None, None) => master
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&rendition.url),
    };

    let text = tokio::fs::read_to_string(&path).await?;
    let playlist = parse_media_playlist(&text)?;

    let location = match remote {
        Some(url) => url,
        None => file_url(&path)?,
    };
    Ok((playlist, location))
}

fn file_url(path: &Path) -> Result<Url> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute).map_err(|()| {
        AppError::InvalidInput(format!("cannot turn {} into a URL", absolute.display()))
    })
}
