//! Rendition selection by name or through an injected chooser.

use tracing::debug;

use crate::error::VodError;
use crate::playlist::Rendition;

/// Sort key sentinel. Audio-only renditions and renditions whose name does
/// not start with a height sort here, at the end.
pub const SORT_KEY_MAX: i64 = 1_000_000;

/// Quality name that always refers to the source rendition.
pub const SOURCE_QUALITY: &str = "source";

/// Display order key: source first, then by descending height parsed from the
/// name (`720p60` -> 720), then audio-only and unparseable names.
pub fn sort_key(rendition: &Rendition) -> i64 {
    if rendition.is_source {
        return 0;
    }
    if rendition.is_audio_only() {
        return SORT_KEY_MAX;
    }
    leading_height(&rendition.name)
        .map_or(SORT_KEY_MAX, |height| SORT_KEY_MAX.saturating_sub(height))
}

fn leading_height(name: &str) -> Option<i64> {
    name.split('p').next()?.trim().parse().ok()
}

/// Renditions in display order. The sort is stable, so ties keep their
/// input order.
pub fn sorted_renditions(renditions: &[Rendition]) -> Vec<&Rendition> {
    let mut sorted: Vec<&Rendition> = renditions.iter().collect();
    sorted.sort_by_key(|rendition| sort_key(rendition));
    sorted
}

/// 1-based number of the choice offered by default: the source rendition if
/// there is one, otherwise the first entry.
pub fn default_choice(sorted: &[&Rendition]) -> usize {
    sorted
        .iter()
        .rposition(|rendition| rendition.is_source)
        .map_or(1, |position| position + 1)
}

/// Picks one of a list of renditions, e.g. by prompting the user.
pub trait RenditionChooser {
    /// Returns the 1-based number of the chosen entry of `choices`, which are
    /// in display order. `default` is the 1-based number to preselect.
    fn choose(&mut self, choices: &[&Rendition], default: usize) -> Result<usize, VodError>;
}

impl<F> RenditionChooser for F
where
    F: FnMut(&[&Rendition], usize) -> Result<usize, VodError>,
{
    fn choose(&mut self, choices: &[&Rendition], default: usize) -> Result<usize, VodError> {
        self(choices, default)
    }
}

/// Chooser that always accepts the default entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChooser;

impl RenditionChooser for DefaultChooser {
    fn choose(&mut self, _choices: &[&Rendition], default: usize) -> Result<usize, VodError> {
        Ok(default)
    }
}

/// Finds the rendition requested by `quality`.
///
/// `source` selects the first source rendition. Any other value must equal a
/// rendition's name or group id exactly.
pub fn select_by_name<'a>(
    renditions: &'a [Rendition],
    quality: &str,
) -> Result<&'a Rendition, VodError> {
    if quality == SOURCE_QUALITY {
        return renditions
            .iter()
            .find(|rendition| rendition.is_source)
            .ok_or(VodError::SourceQualityNotFound);
    }

    renditions
        .iter()
        .find(|rendition| rendition.name == quality || rendition.group_id == quality)
        .ok_or_else(|| VodError::QualityNotFound {
            requested: quality.to_string(),
            available: renditions
                .iter()
                .map(|rendition| rendition.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Offers the renditions in display order to `chooser` and returns its pick.
pub fn select_interactive<'a, C>(
    renditions: &'a [Rendition],
    chooser: &mut C,
) -> Result<&'a Rendition, VodError>
where
    C: RenditionChooser + ?Sized,
{
    if renditions.is_empty() {
        return Err(VodError::selection("no renditions to choose from"));
    }

    let sorted = sorted_renditions(renditions);
    let default = default_choice(&sorted);
    let choice = chooser.choose(&sorted, default)?;

    let chosen = choice
        .checked_sub(1)
        .and_then(|idx| sorted.get(idx).copied())
        .ok_or(VodError::InvalidChoice {
            choice,
            max: sorted.len(),
        })?;
    debug!(choice, name = %chosen.name, "Rendition chosen");
    Ok(chosen)
}

/// Selects by name when a quality was requested, otherwise asks `chooser`.
pub fn select_rendition<'a, C>(
    renditions: &'a [Rendition],
    quality: Option<&str>,
    chooser: &mut C,
) -> Result<&'a Rendition, VodError>
where
    C: RenditionChooser + ?Sized,
{
    match quality {
        Some(quality) => select_by_name(renditions, quality),
        None => select_interactive(renditions, chooser),
    }
}
