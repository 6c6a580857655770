//! Builds the playlist used to join downloaded segments back together.

use std::collections::HashMap;
use std::path::Path;

use m3u8_rs::{Map, MediaPlaylist};
use tracing::{debug, warn};

use crate::error::VodError;
use crate::playlist::{Vod, local_file_name, playlist_level_map};

/// Returns a copy of `playlist` listing only the segments of `vods`, each
/// pointing at the file name of the matching entry of `targets`.
///
/// Segment order follows the original playlist. Initialization maps are
/// rewritten to local file names too, and the map in effect for the first
/// kept segment is attached to it when the segment that declared it was
/// dropped or the map was only declared at playlist level.
pub fn make_join_playlist<P: AsRef<Path>>(
    playlist: &MediaPlaylist,
    vods: &[Vod],
    targets: &[P],
) -> Result<MediaPlaylist, VodError> {
    if vods.len() != targets.len() {
        return Err(VodError::TargetMismatch {
            segments: vods.len(),
            targets: targets.len(),
        });
    }

    let mut path_map: HashMap<&str, String> = HashMap::with_capacity(vods.len());
    for (vod, target) in vods.iter().zip(targets) {
        let name = target_file_name(target.as_ref());
        if path_map.insert(vod.path.as_str(), name).is_some() {
            warn!("Segment {} is listed more than once", vod.path);
        }
    }

    let level_map = playlist_level_map(playlist);
    let mut segments = Vec::with_capacity(path_map.len());
    let mut active_map: Option<&Map> = level_map.as_ref();
    let mut emitted_map: Option<Map> = None;

    for segment in &playlist.segments {
        if let Some(map) = &segment.map {
            active_map = Some(map);
        }
        let Some(local) = path_map.get(segment.uri.as_str()) else {
            continue;
        };

        let mut kept = segment.clone();
        kept.uri = local.clone();

        let effective = active_map.map(localize_map);
        if kept.map.is_some() || !same_map(effective.as_ref(), emitted_map.as_ref()) {
            kept.map = effective.clone();
        }
        if effective.is_some() {
            emitted_map = effective;
        }

        segments.push(kept);
    }

    debug!(
        "Join playlist keeps {} of {} segments",
        segments.len(),
        playlist.segments.len()
    );

    // the map now travels on the segments
    let unknown_tags = playlist
        .unknown_tags
        .iter()
        .filter(|tag| tag.tag != "X-MAP")
        .cloned()
        .collect();

    Ok(MediaPlaylist {
        segments,
        unknown_tags,
        ..playlist.clone()
    })
}

/// Serializes a media playlist to its text form.
pub fn render_playlist(playlist: &MediaPlaylist) -> Result<String, VodError> {
    let mut buf = Vec::new();
    playlist.write_to(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

fn target_file_name(target: &Path) -> String {
    target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.to_string_lossy().into_owned())
}

fn localize_map(map: &Map) -> Map {
    Map {
        uri: local_file_name(&map.uri),
        ..map.clone()
    }
}

fn same_map(a: Option<&Map>, b: Option<&Map>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.uri == b.uri && a.byte_range == b.byte_range,
        (None, None) => true,
        _ => false,
    }
}
