use super::value_objects::{Band, BandLabel, PriceBounds};
use serde::{Serialize, Serializer};

/// Domain entity - one bar slot of the bands chart
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEntry {
    Band(Band),
    /// Synthetic zero-balance slot for the band holding the oracle price.
    OracleMarker { index: i64 },
    /// Synthetic zero-balance slot standing in for empty buckets up to the oracle.
    Filler(BandLabel),
}

impl DisplayEntry {
    pub fn label(&self) -> BandLabel {
        match self {
            Self::Band(band) => BandLabel::Single(band.index),
            Self::OracleMarker { index } => BandLabel::Single(*index),
            Self::Filler(label) => *label,
        }
    }

    /// Band index for entries that stand for exactly one bucket.
    pub fn band_index(&self) -> Option<i64> {
        self.label().single()
    }

    pub fn band(&self) -> Option<&Band> {
        match self {
            Self::Band(band) => Some(band),
            _ => None,
        }
    }

    pub fn collateral_amount(&self) -> f64 {
        self.band().map_or(0.0, |b| b.collateral_amount)
    }

    pub fn collateral_usd_value(&self) -> f64 {
        self.band().map_or(0.0, |b| b.collateral_usd_value)
    }

    pub fn borrowed_amount(&self) -> f64 {
        self.band().map_or(0.0, |b| b.borrowed_amount)
    }

    pub fn price_bounds(&self) -> Option<PriceBounds> {
        self.band().and_then(|b| b.price_bounds)
    }

    pub fn is_liquidation_band(&self) -> bool {
        self.band().is_some_and(|b| b.is_liquidation_band)
    }

    pub fn is_oracle_price_band(&self) -> bool {
        matches!(self, Self::OracleMarker { .. })
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Filler(BandLabel::Range(..)))
    }

    /// Whether the entry must stay visible when a market view is trimmed.
    pub fn is_interesting(&self) -> bool {
        self.collateral_amount() != 0.0
            || self.collateral_usd_value() != 0.0
            || self.is_liquidation_band()
            || self.is_oracle_price_band()
            || self.borrowed_amount() != 0.0
            || self.is_grouped()
    }
}

impl From<Band> for DisplayEntry {
    fn from(band: Band) -> Self {
        Self::Band(band)
    }
}

/// Wire shape consumed by the chart component.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartBar {
    n: String,
    collateral: f64,
    collateral_usd: f64,
    borrowed: f64,
    is_liquidation_band: bool,
    is_oracle_price_band: bool,
    #[serde(rename = "isNGrouped")]
    is_n_grouped: bool,
    #[serde(rename = "p_down", skip_serializing_if = "Option::is_none")]
    price_down: Option<f64>,
    #[serde(rename = "p_up", skip_serializing_if = "Option::is_none")]
    price_up: Option<f64>,
    #[serde(rename = "pUpDownMedian", skip_serializing_if = "Option::is_none")]
    price_median: Option<f64>,
}

impl Serialize for DisplayEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bounds = self.price_bounds();
        ChartBar {
            n: self.label().to_string(),
            collateral: self.collateral_amount(),
            collateral_usd: self.collateral_usd_value(),
            borrowed: self.borrowed_amount(),
            is_liquidation_band: self.is_liquidation_band(),
            is_oracle_price_band: self.is_oracle_price_band(),
            is_n_grouped: self.is_grouped(),
            price_down: bounds.map(|b| b.down),
            price_up: bounds.map(|b| b.up),
            price_median: bounds.map(|b| b.median()),
        }
        .serialize(serializer)
    }
}
