//! Pairs of remote segment locations and the local files they download to.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::error::VodError;
use crate::playlist::{Vod, local_file_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTarget {
    pub url: String,
    pub path: PathBuf,
}

/// Local paths of `vods` inside `dir`, in the same order.
pub fn segment_targets(vods: &[Vod], dir: &Path) -> Vec<PathBuf> {
    vods.iter().map(|vod| dir.join(&vod.filename)).collect()
}

/// Resolves a playlist entry against the URL of the playlist listing it.
/// Absolute entries are returned as they are.
pub fn resolve_url(playlist_url: &Url, path: &str) -> Result<Url, VodError> {
    playlist_url
        .join(path)
        .map_err(|e| VodError::invalid_url(path, e.to_string()))
}

pub fn download_targets(
    playlist_url: &Url,
    vods: &[Vod],
    dir: &Path,
) -> Result<Vec<DownloadTarget>, VodError> {
    vods.iter()
        .map(|vod| {
            Ok(DownloadTarget {
                url: resolve_url(playlist_url, &vod.path)?.to_string(),
                path: dir.join(&vod.filename),
            })
        })
        .collect()
}

/// Download targets for initialization sections, sorted by URI. Each one is
/// stored under the last component of its URI, which is also the name the
/// join playlist refers to it by. Sections sharing a file name end up at the
/// same path, which is logged as a warning.
pub fn init_section_targets(
    playlist_url: &Url,
    sections: &HashSet<String>,
    dir: &Path,
) -> Result<Vec<DownloadTarget>, VodError> {
    let mut sections: Vec<&String> = sections.iter().collect();
    sections.sort();

    let mut seen = HashSet::with_capacity(sections.len());
    sections
        .into_iter()
        .map(|uri| {
            let name = local_file_name(uri);
            if !seen.insert(name.clone()) {
                warn!("Init section {uri} shares the local name {name} with another section");
            }
            Ok(DownloadTarget {
                url: resolve_url(playlist_url, uri)?.to_string(),
                path: dir.join(name),
            })
        })
        .collect()
}
