use derive_more::{Constructor, Display};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};

/// Value Object - lower/upper price of one band
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct PriceBounds {
    pub down: f64,
    pub up: f64,
}

impl PriceBounds {
    pub fn median(&self) -> f64 {
        (self.up + self.down) / 2.0
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.down && price <= self.up
    }
}

/// Value Object - the `n` shown on the chart axis for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BandLabel {
    #[display(fmt = "{}", _0)]
    Single(i64),
    #[display(fmt = "{}...{}", _0, _1)]
    Range(i64, i64),
}

impl BandLabel {
    /// Label for the empty buckets `from..=to`; one bucket collapses to `Single`.
    pub fn span(from: i64, to: i64) -> Self {
        if from == to { Self::Single(from) } else { Self::Range(from, to) }
    }

    pub fn single(&self) -> Option<i64> {
        match self {
            Self::Single(n) => Some(*n),
            Self::Range(..) => None,
        }
    }
}

/// Direction in which band indices run through a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString, AsRefStr)]
pub enum BandOrder {
    /// Highest index first; the convention of the band data source.
    #[strum(serialize = "descending")]
    Descending,
    #[strum(serialize = "ascending")]
    Ascending,
}

impl BandOrder {
    /// Order implied by the two edges. A single band counts as descending.
    pub fn of(first_index: i64, last_index: i64) -> Self {
        if first_index >= last_index { Self::Descending } else { Self::Ascending }
    }
}

/// Domain value - one price bucket of the AMM liquidation curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    #[serde(deserialize_with = "deserialize_band_index")]
    pub index: i64,
    #[serde(default)]
    pub collateral_amount: f64,
    #[serde(default)]
    pub collateral_usd_value: f64,
    #[serde(default)]
    pub borrowed_amount: f64,
    #[serde(default, deserialize_with = "deserialize_liquidation_flag")]
    pub is_liquidation_band: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_bounds: Option<PriceBounds>,
}

impl Band {
    /// Unused bucket: every balance zero.
    pub fn empty(index: i64) -> Self {
        Self {
            index,
            collateral_amount: 0.0,
            collateral_usd_value: 0.0,
            borrowed_amount: 0.0,
            is_liquidation_band: false,
            price_bounds: None,
        }
    }

    pub fn with_collateral(mut self, amount: f64, usd_value: f64) -> Self {
        self.collateral_amount = amount;
        self.collateral_usd_value = usd_value;
        self
    }

    pub fn with_borrowed(mut self, amount: f64) -> Self {
        self.borrowed_amount = amount;
        self
    }

    pub fn with_price_bounds(mut self, down: f64, up: f64) -> Self {
        self.price_bounds = Some(PriceBounds::new(down, up));
        self
    }

    pub fn in_soft_liquidation(mut self) -> Self {
        self.is_liquidation_band = true;
        self
    }

    pub fn has_balance(&self) -> bool {
        self.collateral_amount != 0.0 || self.collateral_usd_value != 0.0 || self.borrowed_amount != 0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBandIndex {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Accepts `101`, `101.0` and `"101"`.
fn deserialize_band_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match RawBandIndex::deserialize(deserializer)? {
        RawBandIndex::Integer(n) => Ok(n),
        RawBandIndex::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        RawBandIndex::Float(f) => Err(D::Error::custom(format!("band index {} is not an integer", f))),
        RawBandIndex::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("band index {:?} is not an integer", text))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLiquidationFlag {
    Flag(bool),
    Label(String),
    Missing,
}

/// Accepts a boolean, a label such as `"SL"` (empty string means no) or null.
fn deserialize_liquidation_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match RawLiquidationFlag::deserialize(deserializer)? {
        RawLiquidationFlag::Flag(flag) => flag,
        RawLiquidationFlag::Label(label) => !label.is_empty(),
        RawLiquidationFlag::Missing => false,
    })
}
