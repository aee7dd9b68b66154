use crate::domain::errors::AppResult;
use serde::{Deserialize, Serialize};

/// Tunables of one bands chart. Every field is optional in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartSettings {
    /// Zoom controls appear once the sequence is longer than this.
    pub brush_window: usize,
    /// Bands of context around the user range when zooming in.
    pub zoom_padding_bands: usize,
    /// Cut empty leading/trailing bands off the market view.
    pub trim_market_view: bool,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self { brush_window: 50, zoom_padding_bands: 2, trim_market_view: true }
    }
}

impl ChartSettings {
    /// Shows every band as delivered; used for a position's own chart.
    pub fn untrimmed() -> Self {
        Self { trim_market_view: false, ..Self::default() }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
