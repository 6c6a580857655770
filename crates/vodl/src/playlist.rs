//! Parsing of master and media playlists into renditions and VOD segments.

use std::collections::HashSet;
use std::path::Path;

use m3u8_rs::{
    AlternativeMediaType, ByteRange, Map, MasterPlaylist, MediaPlaylist, Playlist, VariantStream,
};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::VodError;
use crate::selection::sort_key;

/// Group id of the original, untranscoded rendition.
pub const SOURCE_GROUP_ID: &str = "chunked";

/// Group id of the audio-only rendition.
pub const AUDIO_ONLY_GROUP_ID: &str = "audio_only";

/// Zero padding applied to the index part of local segment file names.
pub const FILENAME_WIDTH: usize = 5;

/// A selectable quality stream listed in a master playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendition {
    /// Display label, e.g. `1080p60`. Not guaranteed to be unique.
    pub name: String,
    pub group_id: String,
    /// `{width}x{height}`, absent for audio-only streams.
    pub resolution: Option<String>,
    /// Location of the rendition's media playlist.
    pub url: String,
    pub is_source: bool,
}

impl Rendition {
    pub fn new(
        name: impl Into<String>,
        group_id: impl Into<String>,
        resolution: Option<String>,
        url: impl Into<String>,
    ) -> Self {
        let group_id = group_id.into();
        let is_source = group_id == SOURCE_GROUP_ID;
        Self {
            name: name.into(),
            group_id,
            resolution,
            url: url.into(),
            is_source,
        }
    }

    pub fn is_audio_only(&self) -> bool {
        self.group_id == AUDIO_ONLY_GROUP_ID
    }
}

/// One media segment of a rendition, in playback order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vod {
    /// Zero-based position of the segment in its playlist.
    pub index: usize,
    /// Segment URI exactly as written in the playlist.
    pub path: String,
    /// Segment length in seconds.
    pub duration: f64,
    /// Local file name the segment is downloaded to.
    pub filename: String,
}

impl Vod {
    pub fn new(index: usize, path: impl Into<String>, duration: f64) -> Self {
        let path = path.into();
        let filename = vod_filename(index, &path);
        Self {
            index,
            path,
            duration,
            filename,
        }
    }
}

/// Local file name for the segment at `index`: the index zero-padded to
/// [`FILENAME_WIDTH`] digits followed by the extension of `path`.
///
/// Indices wider than the padding are written in full, never truncated.
pub fn vod_filename(index: usize, path: &str) -> String {
    let ext = Path::new(&uri_path(path))
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("{index:0width$}{ext}", width = FILENAME_WIDTH)
}

/// Last path component of a playlist URI, ignoring any query or fragment.
pub fn local_file_name(uri: &str) -> String {
    let path = uri_path(uri);
    Path::new(&path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(path)
}

/// Path part of a URI that may be absolute or relative to its playlist.
fn uri_path(uri: &str) -> String {
    if let Ok(url) = Url::parse(uri) {
        return url.path().to_string();
    }
    let end = uri.find(|c| c == '?' || c == '#').unwrap_or(uri.len());
    uri[..end].to_string()
}

fn parse_playlist(text: &str) -> Result<Playlist, VodError> {
    m3u8_rs::parse_playlist_res(text.as_bytes()).map_err(|e| VodError::parse(e.to_string()))
}

pub fn parse_master_playlist(text: &str) -> Result<MasterPlaylist, VodError> {
    match parse_playlist(text)? {
        Playlist::MasterPlaylist(pl) => Ok(pl),
        Playlist::MediaPlaylist(_) => Err(VodError::parse(
            "expected a master playlist, got a media playlist",
        )),
    }
}

pub fn parse_media_playlist(text: &str) -> Result<MediaPlaylist, VodError> {
    match parse_playlist(text)? {
        Playlist::MediaPlaylist(pl) => Ok(pl),
        Playlist::MasterPlaylist(_) => Err(VodError::parse(
            "expected a media playlist, got a master playlist",
        )),
    }
}

/// Parses the renditions of a master playlist, source first and audio-only
/// last, with the rest ordered by descending resolution.
///
/// I-frame-only variants are skipped. Every other variant must reference an
/// `EXT-X-MEDIA` entry of the matching type through its audio, video or
/// subtitles group, looked up in that order.
pub fn parse_renditions(text: &str) -> Result<Vec<Rendition>, VodError> {
    let master = parse_master_playlist(text)?;

    let mut renditions = master
        .variants
        .iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| rendition_from_variant(&master, variant))
        .collect::<Result<Vec<_>, _>>()?;

    renditions.sort_by_key(sort_key);
    debug!("Parsed {} renditions from master playlist", renditions.len());
    Ok(renditions)
}

fn rendition_from_variant(
    master: &MasterPlaylist,
    variant: &VariantStream,
) -> Result<Rendition, VodError> {
    let groups = [
        (AlternativeMediaType::Audio, &variant.audio),
        (AlternativeMediaType::Video, &variant.video),
        (AlternativeMediaType::Subtitles, &variant.subtitles),
    ];
    let media = groups
        .iter()
        .find_map(|(media_type, group)| {
            let group = group.as_deref()?;
            master
                .alternatives
                .iter()
                .find(|media| media.media_type == *media_type && media.group_id == group)
        })
        .ok_or_else(|| {
            VodError::malformed(format!(
                "variant {} does not reference any EXT-X-MEDIA rendition",
                variant.uri
            ))
        })?;

    let resolution = variant
        .resolution
        .map(|r| format!("{}x{}", r.width, r.height));

    trace!(
        name = %media.name,
        group_id = %media.group_id,
        resolution = ?resolution,
        "Found rendition"
    );
    Ok(Rendition::new(
        media.name.clone(),
        media.group_id.clone(),
        resolution,
        variant.uri.clone(),
    ))
}

/// Lists the segments of a media playlist in playback order.
///
/// A segment without a URI or without a duration makes the whole playlist
/// unusable, since the download could not be reassembled correctly.
///
/// m3u8-rs stores a missing `EXTINF` duration as zero, so an explicit
/// `#EXTINF:0,` cannot be told apart from a missing one and is rejected too.
pub fn enumerate_vods(playlist: &MediaPlaylist) -> Result<Vec<Vod>, VodError> {
    playlist
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            if segment.uri.is_empty() {
                return Err(VodError::malformed(format!("segment {index} has no URI")));
            }
            // m3u8-rs leaves the duration at zero when EXTINF is missing.
            if !segment.duration.is_finite() || segment.duration <= 0.0 {
                return Err(VodError::malformed(format!(
                    "segment {index} ({}) has no duration",
                    segment.uri
                )));
            }
            Ok(Vod::new(index, segment.uri.clone(), widen_duration(segment.duration)))
        })
        .collect()
}

/// Converts an EXTINF duration to `f64` through its shortest decimal form, so
/// `9.98` stays `9.98` instead of `9.979999542236328`.
fn widen_duration(duration: f32) -> f64 {
    duration
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(duration))
}

/// Distinct initialization section URIs referenced by a media playlist.
pub fn get_init_sections(playlist: &MediaPlaylist) -> HashSet<String> {
    playlist
        .segments
        .iter()
        .filter_map(|segment| segment.map.as_ref())
        .map(|map| map.uri.clone())
        .chain(playlist_level_map(playlist).map(|map| map.uri))
        .filter(|uri| !uri.is_empty())
        .collect()
}

/// An `EXT-X-MAP` that m3u8-rs kept among the playlist-level unknown tags
/// instead of attaching it to a segment. It applies from the first segment on.
pub(crate) fn playlist_level_map(playlist: &MediaPlaylist) -> Option<Map> {
    let tag = playlist
        .unknown_tags
        .iter()
        .rev()
        .find(|t| t.tag == "X-MAP")?;
    let rest = tag.rest.as_deref()?;

    let mut uri = None;
    let mut byte_range = None;
    for attribute in split_attributes(rest) {
        let Some((key, value)) = attribute.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim().to_ascii_uppercase().as_str() {
            "URI" => uri = Some(value.to_string()),
            "BYTERANGE" => byte_range = parse_byte_range(value),
            _ => {}
        }
    }

    Some(Map {
        uri: uri.filter(|uri| !uri.is_empty())?,
        byte_range,
        ..Map::default()
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parses `<length>[@<offset>]`.
fn parse_byte_range(value: &str) -> Option<ByteRange> {
    let (length, offset) = match value.split_once('@') {
        Some((length, offset)) => (length, Some(offset.trim().parse().ok()?)),
        None => (value, None),
    };
    Some(ByteRange {
        length: length.trim().parse().ok()?,
        offset,
    })
}

/// Splits an attribute list on commas that are not inside quotes.
fn split_attributes(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in list.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use m3u8_rs::ExtTag;

    const MASTER: &str = "#EXTM3U\n\
#EXT-X-TWITCH-INFO:ORIGIN=\"s3\",B=\"false\",REGION=\"EU\"\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"720p30\",NAME=\"720p\",AUTOSELECT=YES,DEFAULT=YES\n\
#EXT-X-STREAM-INF:BANDWIDTH=2373000,RESOLUTION=1280x720,CODECS=\"avc1.4D401F,mp4a.40.2\",VIDEO=\"720p30\",FRAME-RATE=30.000\n\
https://vod.example.net/abc/720p30/index-dvr.m3u8\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"audio_only\",NAME=\"Audio Only\",AUTOSELECT=NO,DEFAULT=NO\n\
#EXT-X-STREAM-INF:BANDWIDTH=160000,CODECS=\"mp4a.40.2\",VIDEO=\"audio_only\"\n\
https://vod.example.net/abc/audio_only/index-dvr.m3u8\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"chunked\",NAME=\"1080p60\",AUTOSELECT=NO,DEFAULT=NO\n\
#EXT-X-STREAM-INF:BANDWIDTH=8534030,RESOLUTION=1920x1080,CODECS=\"avc1.64002A,mp4a.40.2\",VIDEO=\"chunked\",FRAME-RATE=59.996\n\
https://vod.example.net/abc/chunked/index-dvr.m3u8\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"480p30\",NAME=\"480p\",AUTOSELECT=YES,DEFAULT=YES\n\
#EXT-X-STREAM-INF:BANDWIDTH=1427999,RESOLUTION=852x480,CODECS=\"avc1.4D401F,mp4a.40.2\",VIDEO=\"480p30\",FRAME-RATE=30.000\n\
https://vod.example.net/abc/480p30/index-dvr.m3u8\n";

    const MEDIA: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:10\n\
#EXT-X-PLAYLIST-TYPE:EVENT\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:10.000,\n\
0.ts\n\
#EXTINF:10.000,\n\
1.ts\n\
#EXTINF:9.98,\n\
2-muted.ts?token=abc\n\
#EXT-X-ENDLIST\n";

    #[test]
    fn parses_renditions_in_display_order() {
        let renditions = parse_renditions(MASTER).expect("master should parse");
        let names: Vec<_> = renditions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["1080p60", "720p", "480p", "Audio Only"]);

        let source = &renditions[0];
        assert!(source.is_source);
        assert_eq!(source.group_id, "chunked");
        assert_eq!(source.resolution.as_deref(), Some("1920x1080"));
        assert_eq!(
            source.url,
            "https://vod.example.net/abc/chunked/index-dvr.m3u8"
        );
    }

    #[test]
    fn audio_only_rendition_has_no_resolution() {
        let renditions = parse_renditions(MASTER).expect("master should parse");
        let audio = renditions
            .iter()
            .find(|r| r.is_audio_only())
            .expect("audio only rendition");
        assert_eq!(audio.resolution, None);
        assert!(!audio.is_source);
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_renditions(MASTER).unwrap();
        let second = parse_renditions(MASTER).unwrap();
        assert_eq!(first, second);

        let media = parse_media_playlist(MEDIA).unwrap();
        assert_eq!(enumerate_vods(&media).unwrap(), enumerate_vods(&media).unwrap());
    }

    #[test]
    fn variant_without_media_is_malformed() {
        let master = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000000,RESOLUTION=1280x720\n\
720p/index.m3u8\n";
        let err = parse_renditions(master).unwrap_err();
        assert!(matches!(err, VodError::MalformedPlaylist { .. }));
    }

    #[test]
    fn media_playlist_is_not_a_master() {
        let err = parse_renditions(MEDIA).unwrap_err();
        assert!(matches!(err, VodError::Parse { .. }));
    }

    #[test]
    fn enumerates_vods_with_local_filenames() {
        let media = parse_media_playlist(MEDIA).unwrap();
        let vods = enumerate_vods(&media).unwrap();

        assert_eq!(vods.len(), 3);
        assert_eq!(vods[0], Vod::new(0, "0.ts", 10.0));
        assert_eq!(vods[2].path, "2-muted.ts?token=abc");
        assert_eq!(vods[2].filename, "00002.ts");
        assert_eq!(vods[2].duration, 9.98);
        assert!(vods.iter().enumerate().all(|(i, vod)| vod.index == i));
    }

    #[test]
    fn segment_without_duration_is_malformed() {
        let mut media = parse_media_playlist(MEDIA).unwrap();
        media.segments[1].duration = 0.0;
        let err = enumerate_vods(&media).unwrap_err();
        assert!(matches!(err, VodError::MalformedPlaylist { .. }));
        assert!(err.to_string().contains("segment 1"));
    }

    #[test]
    fn segment_without_uri_is_malformed() {
        let mut media = parse_media_playlist(MEDIA).unwrap();
        media.segments[0].uri.clear();
        let err = enumerate_vods(&media).unwrap_err();
        assert!(matches!(err, VodError::MalformedPlaylist { .. }));
    }

    #[test]
    fn filename_is_zero_padded_and_never_truncated() {
        assert_eq!(vod_filename(7, "7.ts"), "00007.ts");
        assert_eq!(vod_filename(100000, "100000.ts"), "100000.ts");
        assert_eq!(
            vod_filename(3, "https://cdn.example.net/v/3.mp4?sig=1#t"),
            "00003.mp4"
        );
        assert_eq!(vod_filename(12, "segment"), "00012");
    }

    #[test]
    fn local_file_name_strips_directories_and_query() {
        assert_eq!(local_file_name("init-0.mp4"), "init-0.mp4");
        assert_eq!(
            local_file_name("https://cdn.example.net/v/init-1.mp4?sig=1"),
            "init-1.mp4"
        );
        assert_eq!(local_file_name("a/b/c.ts#frag"), "c.ts");
    }

    #[test]
    fn init_sections_collapse_duplicates() {
        let media = parse_media_playlist(
            "#EXTM3U\n\
#EXT-X-VERSION:6\n\
#EXT-X-TARGETDURATION:10\n\
#EXT-X-MAP:URI=\"init-0.mp4\"\n\
#EXTINF:10.000,\n\
0.mp4\n\
#EXT-X-MAP:URI=\"init-0.mp4\"\n\
#EXTINF:10.000,\n\
1.mp4\n\
#EXT-X-DISCONTINUITY\n\
#EXT-X-MAP:URI=\"init-1.mp4\"\n\
#EXTINF:10.000,\n\
2.mp4\n\
#EXT-X-ENDLIST\n",
        )
        .unwrap();

        let sections = get_init_sections(&media);
        let expected: HashSet<String> = ["init-0.mp4", "init-1.mp4"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(sections, expected);
    }

    #[test]
    fn init_sections_include_playlist_level_map() {
        let mut media = parse_media_playlist(MEDIA).unwrap();
        media.unknown_tags.push(ExtTag {
            tag: "X-MAP".to_string(),
            rest: Some("URI=\"init,0.mp4\",BYTERANGE=\"720@0\"".to_string()),
        });

        let sections = get_init_sections(&media);
        assert_eq!(sections.len(), 1);
        assert!(sections.contains("init,0.mp4"));

        let map = playlist_level_map(&media).expect("playlist level map");
        assert_eq!(
            map.byte_range,
            Some(ByteRange {
                length: 720,
                offset: Some(0)
            })
        );
    }

    #[test]
    fn audio_group_is_looked_up_before_video() {
        let master = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"vid\",NAME=\"Video Track\"\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"English\",URI=\"audio/en.m3u8\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000000,RESOLUTION=1280x720,AUDIO=\"aud\",VIDEO=\"vid\"\n\
720p/index.m3u8\n";
        let renditions = parse_renditions(master).unwrap();
        assert_eq!(renditions.len(), 1);
        assert_eq!(renditions[0].name, "English");
        assert_eq!(renditions[0].group_id, "aud");
    }

    #[test]
    fn media_of_another_type_does_not_match_group() {
        let master = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"720p30\",NAME=\"720p\",URI=\"audio.m3u8\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=1000000,RESOLUTION=1280x720,VIDEO=\"720p30\"\n\
720p30/index.m3u8\n";
        let err = parse_renditions(master).unwrap_err();
        assert!(matches!(err, VodError::MalformedPlaylist { .. }));
    }

    #[test]
    fn explicit_zero_duration_is_rejected() {
        let media = parse_media_playlist(
            "#EXTM3U\n\
#EXT-X-TARGETDURATION:10\n\
#EXTINF:10.000,\n\
0.ts\n\
#EXTINF:0,\n\
1.ts\n\
#EXT-X-ENDLIST\n",
        )
        .unwrap();
        let err = enumerate_vods(&media).unwrap_err();
        assert!(err.to_string().contains("segment 1"));
    }

    #[test]
    fn ts_playlist_has_no_init_sections() {
        let media = parse_media_playlist(MEDIA).unwrap();
        assert!(get_init_sections(&media).is_empty());
    }
}
