use super::value_objects::{BrushRange, IndexRange, ZoomWindow};
use crate::domain::logging::LogComponent;
use crate::log_debug;
use serde_json::Value;
use std::collections::HashSet;

/// Domain entity - auto-zoom state of one chart instance.
///
/// Computes a window once per meaningful change of the user's bands, hands it
/// to the chart options exactly once, and otherwise leaves the chart's zoom
/// alone so manual pan/zoom survives background refreshes.
#[derive(Debug, Clone, Default)]
pub struct ZoomWindowController {
    has_initialized: bool,
    /// Only used to detect changes; never displayed.
    last_user_index_set: HashSet<i64>,
    pending_window: ZoomWindow,
    /// Sequence length `pending_window` was computed against.
    pending_len: usize,
    zoom_pending_application: bool,
    user_window: Option<ZoomWindow>,
    brush: BrushRange,
}

impl ZoomWindowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the pending window from the current sequence length and user set.
    ///
    /// Both inputs must come from the same evaluation pass. Returns whether a new
    /// window was computed. When `index_range` is `None` a complete brush range is
    /// used instead. A window still waiting to be applied is dropped once the
    /// sequence length moves away from the one it was computed for, and computed
    /// again as soon as the inputs allow.
    pub fn evaluate(
        &mut self,
        sequence_len: usize,
        user_band_ids: &HashSet<i64>,
        index_range: Option<IndexRange>,
    ) -> bool {
        if self.zoom_pending_application && self.pending_len != sequence_len {
            // never applied; its percentages belong to another sequence
            self.zoom_pending_application = false;
            self.has_initialized = false;
        }
        if sequence_len == 0 || user_band_ids.is_empty() {
            return false;
        }
        let Some(range) = index_range.or_else(|| self.brush.as_index_range()) else {
            return false;
        };
        if self.has_initialized && !user_set_changed(&self.last_user_index_set, user_band_ids) {
            return false;
        }
        let Some(window) = ZoomWindow::from_indices(range, sequence_len) else {
            return false;
        };

        log_debug!(
            LogComponent::Domain("ZoomWindow"),
            "recomputed window {:?}..{:?} for {} user bands over {} entries",
            window.start,
            window.end,
            user_band_ids.len(),
            sequence_len
        );

        self.pending_window = window;
        self.pending_len = sequence_len;
        self.has_initialized = true;
        self.last_user_index_set = user_band_ids.clone();
        self.zoom_pending_application = true;
        true
    }

    /// Merge a pending window into every slider `dataZoom` control of `options`.
    ///
    /// Only `start`/`end` are touched. Without a pending window, or without a
    /// slider to merge into, the options are left as they are and `false` is
    /// returned; in the latter case the window stays pending.
    pub fn apply(&mut self, options: &mut Value) -> bool {
        if !self.zoom_pending_application || !self.pending_window.is_defined() {
            return false;
        }
        let Some(controls) = options.get_mut("dataZoom").and_then(Value::as_array_mut) else {
            return false;
        };

        let mut merged = false;
        for control in controls.iter_mut() {
            if control.get("type").and_then(Value::as_str) != Some("slider") {
                continue;
            }
            let Some(fields) = control.as_object_mut() else {
                continue;
            };
            if let Some(start) = self.pending_window.start {
                fields.insert("start".to_string(), Value::from(start));
            }
            if let Some(end) = self.pending_window.end {
                fields.insert("end".to_string(), Value::from(end));
            }
            merged = true;
        }

        if merged {
            self.zoom_pending_application = false;
        }
        merged
    }

    /// Manual zoom reported by the chart. Never re-applied by the controller.
    pub fn record_user_zoom(&mut self, window: ZoomWindow) {
        if window.is_defined() {
            self.user_window = Some(window);
        }
    }

    /// Last manual window, else the last computed one.
    pub fn current_window(&self) -> Option<ZoomWindow> {
        self.user_window
            .or_else(|| self.has_initialized.then_some(self.pending_window))
    }

    pub fn set_brush_range(&mut self, brush: BrushRange) {
        self.brush = brush;
    }

    pub fn brush_range(&self) -> BrushRange {
        self.brush
    }

    pub fn reset_brush(&mut self) {
        self.brush = BrushRange::default();
    }

    pub fn has_initialized(&self) -> bool {
        self.has_initialized
    }

    pub fn is_pending(&self) -> bool {
        self.zoom_pending_application
    }

    pub fn pending_window(&self) -> Option<ZoomWindow> {
        self.zoom_pending_application.then_some(self.pending_window)
    }

    /// Length of the sequence the pending window belongs to.
    pub fn pending_len(&self) -> Option<usize> {
        self.zoom_pending_application.then_some(self.pending_len)
    }
}

/// Value comparison: same size and same members.
fn user_set_changed(previous: &HashSet<i64>, current: &HashSet<i64>) -> bool {
    previous.len() != current.len() || previous.symmetric_difference(current).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(indices: &[i64]) -> HashSet<i64> {
        indices.iter().copied().collect()
    }

    fn slider_options() -> Value {
        json!({
            "dataZoom": [
                { "type": "slider", "yAxisIndex": 0 },
                { "type": "inside", "yAxisIndex": 0 }
            ]
        })
    }

    #[test]
    fn not_ready_without_inputs() {
        let mut zoom = ZoomWindowController::new();
        let range = Some(IndexRange::new(0, 3));
        assert!(!zoom.evaluate(0, &ids(&[1]), range));
        assert!(!zoom.evaluate(10, &HashSet::new(), range));
        assert!(!zoom.evaluate(10, &ids(&[1]), None));
        assert!(!zoom.has_initialized());
        assert!(zoom.pending_window().is_none());
    }

    #[test]
    fn apply_touches_only_slider_window_fields() {
        let mut zoom = ZoomWindowController::new();
        assert!(zoom.evaluate(4, &ids(&[7]), Some(IndexRange::new(1, 2))));

        let mut options = slider_options();
        assert!(zoom.apply(&mut options));
        assert_eq!(options["dataZoom"][0]["start"], json!(25.0));
        assert_eq!(options["dataZoom"][0]["end"], json!(75.0));
        assert_eq!(options["dataZoom"][0]["yAxisIndex"], json!(0));
        assert!(options["dataZoom"][1].get("start").is_none());

        let mut next = slider_options();
        assert!(!zoom.apply(&mut next));
        assert_eq!(next, slider_options());
    }

    #[test]
    fn window_stays_pending_until_a_slider_exists() {
        let mut zoom = ZoomWindowController::new();
        zoom.evaluate(4, &ids(&[7]), Some(IndexRange::new(0, 3)));
        let mut bare = json!({ "series": [] });
        assert!(!zoom.apply(&mut bare));
        assert!(zoom.is_pending());
        assert!(zoom.apply(&mut slider_options()));
        assert!(!zoom.is_pending());
    }

    #[test]
    fn brush_stands_in_for_missing_range() {
        let mut zoom = ZoomWindowController::new();
        zoom.set_brush_range(BrushRange::new(Some(5), Some(9)));
        assert!(zoom.evaluate(10, &ids(&[1, 2]), None));
        assert_eq!(zoom.pending_window(), Some(ZoomWindow::new(50.0, 100.0)));
        zoom.reset_brush();
        assert!(zoom.brush_range().is_empty());
    }

    #[test]
    fn pending_window_follows_a_length_change() {
        let mut zoom = ZoomWindowController::new();
        assert!(zoom.evaluate(20, &ids(&[110]), Some(IndexRange::new(7, 11))));
        assert_eq!(zoom.pending_len(), Some(20));

        assert!(!zoom.evaluate(20, &ids(&[110]), Some(IndexRange::new(7, 11))));
        assert!(zoom.evaluate(100, &ids(&[110]), Some(IndexRange::new(87, 91))));
        assert_eq!(zoom.pending_len(), Some(100));
        let window = zoom.pending_window().unwrap();
        assert!((window.start.unwrap() - 87.0).abs() < 1e-9);
        assert!((window.end.unwrap() - 92.0).abs() < 1e-9);

        zoom.apply(&mut slider_options());
        // applied windows stay put across later refetches
        assert!(!zoom.evaluate(120, &ids(&[110]), Some(IndexRange::new(100, 110))));
    }

    #[test]
    fn stale_pending_window_is_dropped_when_it_cannot_be_recomputed() {
        let mut zoom = ZoomWindowController::new();
        zoom.evaluate(20, &ids(&[110]), Some(IndexRange::new(7, 11)));
        assert!(!zoom.evaluate(30, &ids(&[110]), None));
        assert!(!zoom.is_pending());
        assert!(!zoom.apply(&mut slider_options()));
        assert!(zoom.evaluate(30, &ids(&[110]), Some(IndexRange::new(0, 2))));
    }

    #[test]
    fn brush_past_the_end_is_ignored() {
        let mut zoom = ZoomWindowController::new();
        zoom.set_brush_range(BrushRange::new(Some(5), Some(20)));
        assert!(!zoom.evaluate(10, &ids(&[1]), None));
        assert!(zoom.pending_window().is_none());
    }

    #[test]
    fn user_zoom_is_remembered_but_not_reapplied() {
        let mut zoom = ZoomWindowController::new();
        zoom.evaluate(4, &ids(&[7]), Some(IndexRange::new(0, 3)));
        zoom.apply(&mut slider_options());
        zoom.record_user_zoom(ZoomWindow::new(10.0, 30.0));
        assert_eq!(zoom.current_window(), Some(ZoomWindow::new(10.0, 30.0)));
        assert!(!zoom.apply(&mut slider_options()));
    }
}
