use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - which dataset a chart instance shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, AsRefStr)]
pub enum ChartView {
    /// Every band of the market, trimmed to the active window.
    #[display(fmt = "Market")]
    #[strum(serialize = "market")]
    Market,
    /// One position's bands, never trimmed.
    #[display(fmt = "User")]
    #[strum(serialize = "user")]
    User,
}

/// Value Object - inclusive index range into a display sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRange {
    pub start_index: usize,
    pub end_index: usize,
}

/// Value Object - zoom window in percent of the sequence length
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoomWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl ZoomWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    /// `None` for an empty sequence or a range that does not fit it, so every
    /// window stays within 0..=100 and no NaN or infinity ever leaves here.
    pub fn from_indices(range: IndexRange, sequence_len: usize) -> Option<Self> {
        if sequence_len == 0 || range.start_index > range.end_index || range.end_index >= sequence_len {
            return None;
        }
        let len = sequence_len as f64;
        Some(Self::new(
            range.start_index as f64 / len * 100.0,
            (range.end_index + 1) as f64 / len * 100.0,
        ))
    }

    pub fn is_defined(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Within a hair of 0..100.
    pub fn is_full_range(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s <= 0.0001 && e >= 99.999)
    }
}

/// Value Object - brush selection echoed back by the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

impl BrushRange {
    pub fn new(start_index: Option<usize>, end_index: Option<usize>) -> Self {
        Self { start_index, end_index }
    }

    /// Both ends set and in order.
    pub fn as_index_range(&self) -> Option<IndexRange> {
        match (self.start_index, self.end_index) {
            (Some(start), Some(end)) if start <= end => Some(IndexRange::new(start, end)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index.is_none() && self.end_index.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_from_indices_covers_end_band() {
        let window = ZoomWindow::from_indices(IndexRange::new(2, 5), 10).unwrap();
        assert!((window.start.unwrap() - 20.0).abs() < 1e-9);
        assert!((window.end.unwrap() - 60.0).abs() < 1e-9);
        assert!(ZoomWindow::from_indices(IndexRange::new(0, 0), 0).is_none());
        assert!(ZoomWindow::from_indices(IndexRange::new(0, 9), 10).unwrap().is_full_range());
    }

    #[test]
    fn window_from_indices_rejects_ranges_past_the_end() {
        assert!(ZoomWindow::from_indices(IndexRange::new(5, 20), 10).is_none());
        assert!(ZoomWindow::from_indices(IndexRange::new(5, 10), 10).is_none());
        assert!(ZoomWindow::from_indices(IndexRange::new(6, 5), 10).is_none());
    }

    #[test]
    fn brush_needs_both_ends() {
        assert_eq!(BrushRange::new(Some(1), None).as_index_range(), None);
        assert_eq!(BrushRange::new(Some(4), Some(2)).as_index_range(), None);
        assert_eq!(BrushRange::new(Some(2), Some(4)).as_index_range(), Some(IndexRange::new(2, 4)));
        assert!(BrushRange::default().is_empty());
    }

    #[test]
    fn chart_view_parses_from_str() {
        use std::str::FromStr;
        assert_eq!(ChartView::from_str("user").unwrap(), ChartView::User);
        assert_eq!(ChartView::Market.as_ref(), "market");
        assert_eq!(ChartView::Market.to_string(), "Market");
    }
}
