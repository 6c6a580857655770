//! Selection of the segments covering a time window.

use serde::Serialize;
use tracing::{info, trace};

use crate::playlist::Vod;

/// Segments needed for a time window, and how much of them to trim once
/// they are joined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropPlan {
    pub vods: Vec<Vod>,
    /// Seconds to skip at the start of the first kept segment.
    pub crop_start: Option<f64>,
    /// Length of the output after trimming, set only when the window ends
    /// inside a segment.
    pub crop_duration: Option<f64>,
}

impl CropPlan {
    /// Combined duration of the kept segments, before trimming.
    pub fn total_duration(&self) -> f64 {
        self.vods.iter().map(|vod| vod.duration).sum()
    }

    pub fn is_cropped(&self) -> bool {
        self.crop_start.is_some() || self.crop_duration.is_some()
    }
}

/// Keeps the segments overlapping `[start, end)` and computes the trim needed
/// when the bounds fall inside a segment.
///
/// Whole segments are always kept. A segment ending exactly at `start` or
/// starting exactly at `end` is dropped. A bound of zero counts as no bound.
pub fn filter_vods(vods: &[Vod], start: Option<f64>, end: Option<f64>) -> CropPlan {
    let start = start.filter(|&start| start != 0.0);
    let end = end.filter(|&end| end != 0.0);

    let mut kept = Vec::new();
    let mut crop_start = None;
    let mut crop_end = None;
    let mut vod_start = 0.0;

    for vod in vods {
        let vod_end = vod_start + vod.duration;

        if let Some(start) = start
            && vod_start < start
            && start < vod_end
        {
            crop_start = Some(start - vod_start);
        }

        if let Some(end) = end
            && vod_start < end
            && end < vod_end
        {
            crop_end = Some(vod_end - end);
        }

        let after_start = start.is_none_or(|start| vod_end > start);
        let before_end = end.is_none_or(|end| vod_start < end);
        if after_start && before_end {
            trace!(index = vod.index, vod_start, vod_end, "Keeping segment");
            kept.push(vod.clone());
        }

        vod_start = vod_end;
    }

    let crop_duration = crop_end.map(|crop_end| {
        let total: f64 = kept.iter().map(|vod| vod.duration).sum();
        total - crop_start.unwrap_or(0.0) - crop_end
    });

    info!(
        kept = kept.len(),
        total = vods.len(),
        ?crop_start,
        ?crop_duration,
        "Filtered segments"
    );

    CropPlan {
        vods: kept,
        crop_start,
        crop_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vods(durations: &[f64]) -> Vec<Vod> {
        durations
            .iter()
            .enumerate()
            .map(|(index, &duration)| Vod::new(index, format!("{index}.ts"), duration))
            .collect()
    }

    fn indices(plan: &CropPlan) -> Vec<usize> {
        plan.vods.iter().map(|vod| vod.index).collect()
    }

    #[test]
    fn no_bounds_keeps_everything() {
        let all = vods(&[10.0, 10.0, 4.5]);
        let plan = filter_vods(&all, None, None);
        assert_eq!(plan.vods, all);
        assert_eq!(plan.crop_start, None);
        assert_eq!(plan.crop_duration, None);
        assert!(!plan.is_cropped());
    }

    #[test]
    fn window_inside_segments_is_cropped() {
        let all = vods(&[10.0; 5]);
        let plan = filter_vods(&all, Some(15.0), Some(35.0));
        assert_eq!(indices(&plan), [1, 2, 3]);
        assert_eq!(plan.crop_start, Some(5.0));
        assert_eq!(plan.crop_duration, Some(20.0));
        assert_eq!(plan.total_duration(), 30.0);
    }

    #[test]
    fn start_on_boundary_needs_no_crop() {
        let all = vods(&[10.0; 5]);
        let plan = filter_vods(&all, Some(20.0), None);
        assert_eq!(indices(&plan), [2, 3, 4]);
        assert_eq!(plan.crop_start, None);
        assert_eq!(plan.crop_duration, None);
    }

    #[test]
    fn end_on_boundary_sets_no_duration() {
        let all = vods(&[10.0; 5]);
        let plan = filter_vods(&all, None, Some(30.0));
        assert_eq!(indices(&plan), [0, 1, 2]);
        assert_eq!(plan.crop_duration, None);
    }

    #[test]
    fn end_only_crop_duration() {
        let all = vods(&[10.0; 5]);
        let plan = filter_vods(&all, None, Some(25.0));
        assert_eq!(indices(&plan), [0, 1, 2]);
        assert_eq!(plan.crop_start, None);
        assert_eq!(plan.crop_duration, Some(25.0));
    }

    #[test]
    fn end_past_content_keeps_tail_without_duration() {
        let all = vods(&[10.0; 3]);
        let plan = filter_vods(&all, Some(12.5), Some(100.0));
        assert_eq!(indices(&plan), [1, 2]);
        assert_eq!(plan.crop_start, Some(2.5));
        assert_eq!(plan.crop_duration, None);
    }

    #[test]
    fn window_inside_single_segment() {
        let all = vods(&[10.0; 3]);
        let plan = filter_vods(&all, Some(12.0), Some(18.0));
        assert_eq!(indices(&plan), [1]);
        assert_eq!(plan.crop_start, Some(2.0));
        assert_eq!(plan.crop_duration, Some(6.0));
    }

    #[test]
    fn zero_bounds_behave_like_no_bounds() {
        let all = vods(&[10.0; 3]);
        assert_eq!(filter_vods(&all, Some(0.0), None), filter_vods(&all, None, None));
        assert_eq!(filter_vods(&all, None, Some(0.0)), filter_vods(&all, None, None));
        assert_eq!(filter_vods(&all, Some(0.0), Some(0.0)).vods, all);
    }

    #[test]
    fn start_past_content_keeps_nothing() {
        let all = vods(&[10.0; 3]);
        let plan = filter_vods(&all, Some(45.0), None);
        assert!(plan.vods.is_empty());
        assert_eq!(plan.crop_start, None);
    }

    #[test]
    fn uneven_segment_durations() {
        let all = vods(&[2.5, 4.0, 3.5, 6.0]);
        // spans: [0, 2.5) [2.5, 6.5) [6.5, 10) [10, 16)
        let plan = filter_vods(&all, Some(3.0), Some(11.0));
        assert_eq!(indices(&plan), [1, 2, 3]);
        assert_eq!(plan.crop_start, Some(0.5));
        assert_eq!(plan.crop_duration, Some(8.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_kept_segments_overlap_window(
            durations in prop::collection::vec(1u32..20, 1..40),
            start in 1u32..400,
            len in 1u32..400,
        ) {
            let durations: Vec<f64> = durations.into_iter().map(f64::from).collect();
            let all = vods(&durations);
            let (start, end) = (f64::from(start), f64::from(start + len));
            let plan = filter_vods(&all, Some(start), Some(end));

            let mut vod_start = 0.0;
            let mut expected = Vec::new();
            for vod in &all {
                let vod_end = vod_start + vod.duration;
                if vod_end > start && vod_start < end {
                    expected.push(vod.index);
                }
                vod_start = vod_end;
            }
            prop_assert_eq!(indices(&plan), expected);
            prop_assert!(plan.vods.windows(2).all(|w| w[0].index + 1 == w[1].index));
            if let Some(crop_start) = plan.crop_start {
                prop_assert!(crop_start > 0.0);
                prop_assert!(crop_start < plan.vods[0].duration);
            }
            if let Some(crop_duration) = plan.crop_duration {
                prop_assert!(crop_duration > 0.0);
                prop_assert!(crop_duration <= plan.total_duration());
            }
        }
    }
}
