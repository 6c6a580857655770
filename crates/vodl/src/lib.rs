//! Playlist engine for downloading HLS video-on-demand content.
//!
//! The flow is: parse the master playlist into [`Rendition`]s, pick one with
//! [`select_rendition`], enumerate the [`Vod`] segments of its media playlist,
//! narrow them to a time window with [`filter_vods`], and after downloading
//! build a playlist over the local files with [`make_join_playlist`].

pub mod config;
pub mod crop;
pub mod error;
pub mod join;
pub mod mux;
pub mod playlist;
pub mod selection;
pub mod targets;

pub use config::JoinConfig;
pub use crop::{CropPlan, filter_vods};
pub use error::VodError;
pub use join::{make_join_playlist, render_playlist};
pub use mux::JoinCommand;
pub use playlist::{
    Rendition, Vod, enumerate_vods, get_init_sections, parse_media_playlist, parse_renditions,
};
pub use selection::{
    DefaultChooser, RenditionChooser, select_by_name, select_interactive, select_rendition,
    sort_key, sorted_renditions,
};
pub use targets::{DownloadTarget, download_targets, init_section_targets, segment_targets};

// Re-export for callers working with the parsed documents directly.
pub use m3u8_rs::MediaPlaylist;
