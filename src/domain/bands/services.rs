use super::entities::DisplayEntry;
use super::value_objects::{Band, BandLabel, BandOrder};
use crate::domain::chart::IndexRange;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::logging::LogComponent;
use crate::log_trace;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Domain service: raw bands + oracle band -> display sequence
pub struct BandSequenceBuilder;

impl BandSequenceBuilder {
    /// Insert the oracle marker, plus a filler for the empty buckets in between,
    /// on whichever end of the data the oracle band lies beyond.
    ///
    /// The marker is always outermost and the filler sits between it and the data.
    /// When the oracle band is inside `[low, high]` or missing, the bands come back
    /// unchanged.
    pub fn build(bands: &[Band], oracle_price_band: Option<i64>) -> Vec<DisplayEntry> {
        let mut sequence: Vec<DisplayEntry> = bands.iter().cloned().map(DisplayEntry::Band).collect();

        let (Some(oracle), Some(first), Some(last)) = (oracle_price_band, bands.first(), bands.last()) else {
            return sequence;
        };

        let order = BandOrder::of(first.index, last.index);
        let (high, low) = match order {
            BandOrder::Descending => (first.index, last.index),
            BandOrder::Ascending => (last.index, first.index),
        };

        // (filler, goes on the front of the sequence)
        let (filler, at_front) = if oracle > high {
            let filler = (high + 1 != oracle).then(|| BandLabel::span(high + 1, oracle - 1));
            (filler, order == BandOrder::Descending)
        } else if oracle < low {
            let filler = (low - 1 != oracle).then(|| BandLabel::span(low - 1, oracle + 1));
            (filler, order == BandOrder::Ascending)
        } else {
            return sequence;
        };

        log_trace!(
            LogComponent::Domain("BandSequence"),
            "oracle band {} outside [{}, {}], filler {:?}",
            oracle,
            low,
            high,
            filler.map(|f| f.to_string())
        );

        let marker = DisplayEntry::OracleMarker { index: oracle };
        if at_front {
            let mut front = vec![marker];
            front.extend(filler.map(DisplayEntry::Filler));
            front.append(&mut sequence);
            front
        } else {
            sequence.extend(filler.map(DisplayEntry::Filler));
            sequence.push(marker);
            sequence
        }
    }

    /// Checks the raw input shape: strictly monotonic indices, no duplicates.
    /// Gaps are allowed since market feeds drop empty buckets.
    pub fn validate(bands: &[Band]) -> AppResult<Option<BandOrder>> {
        let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
            return Ok(None);
        };
        let order = BandOrder::of(first.index, last.index);
        for pair in bands.windows(2) {
            let ordered = match order {
                BandOrder::Descending => pair[0].index > pair[1].index,
                BandOrder::Ascending => pair[0].index < pair[1].index,
            };
            if !ordered {
                return Err(AppError::ValidationError(format!(
                    "band {} follows band {} in a {} sequence",
                    pair[1].index, pair[0].index, order
                )));
            }
        }
        Ok(Some(order))
    }
}

/// Domain service: cuts leading/trailing uninteresting entries off a market view
pub struct ActiveWindowTrimmer;

impl ActiveWindowTrimmer {
    pub fn active_range(sequence: &[DisplayEntry]) -> Option<RangeInclusive<usize>> {
        let first = sequence.iter().position(DisplayEntry::is_interesting)?;
        let last = sequence.iter().rposition(DisplayEntry::is_interesting)?;
        Some(first..=last)
    }

    /// Empty when nothing in the sequence is interesting.
    pub fn trim(sequence: &[DisplayEntry]) -> &[DisplayEntry] {
        match Self::active_range(sequence) {
            Some(range) => &sequence[range],
            None => &[],
        }
    }
}

/// Domain service: picks the index range the chart should open on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRangePlanner {
    padding: usize,
}

impl Default for ZoomRangePlanner {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ZoomRangePlanner {
    pub fn new(padding: usize) -> Self {
        Self { padding }
    }

    /// First and last position of the user's bands within `sequence`.
    pub fn user_indices(sequence: &[DisplayEntry], user_bands: &[Band]) -> Option<IndexRange> {
        let user_ids: HashSet<i64> = user_bands.iter().map(|b| b.index).collect();
        let is_user = |entry: &DisplayEntry| entry.band_index().is_some_and(|n| user_ids.contains(&n));
        let first = sequence.iter().position(is_user)?;
        let last = sequence.iter().rposition(is_user)?;
        Some(IndexRange::new(first, last))
    }

    /// User range widened to the oracle band, padded and clamped.
    /// Falls back to the full range when the user has nothing on the chart.
    pub fn initial_zoom_indices(
        &self,
        sequence: &[DisplayEntry],
        user_bands: &[Band],
        oracle_price: Option<f64>,
    ) -> Option<IndexRange> {
        let last_index = sequence.len().checked_sub(1)?;
        let Some(user_range) = Self::user_indices(sequence, user_bands) else {
            return Some(IndexRange::new(0, last_index));
        };

        let oracle_idx = sequence
            .iter()
            .position(DisplayEntry::is_oracle_price_band)
            .or_else(|| oracle_price.and_then(|price| closest_band_by_price(sequence, price)));

        let (mut start, mut end) = (user_range.start_index, user_range.end_index);
        if let Some(idx) = oracle_idx {
            start = start.min(idx);
            end = end.max(idx);
        }

        Some(IndexRange::new(
            start.saturating_sub(self.padding),
            (end + self.padding).min(last_index),
        ))
    }
}

/// Index of the priced entry whose band contains `price`, else the closest median.
pub fn closest_band_by_price(sequence: &[DisplayEntry], price: f64) -> Option<usize> {
    if !price.is_finite() {
        return None;
    }
    let priced = || {
        sequence
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| entry.price_bounds().map(|bounds| (idx, bounds)))
    };
    priced()
        .find(|(_, bounds)| bounds.contains(price))
        .or_else(|| {
            priced().min_by(|(_, a), (_, b)| {
                (a.median() - price).abs().total_cmp(&(b.median() - price).abs())
            })
        })
        .map(|(idx, _)| idx)
}

/// Price span covered by the user's bands, for highlighting on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPriceRange {
    pub upper_price_up: f64,
    pub upper_median: f64,
    pub lower_price_down: f64,
    pub lower_median: f64,
}

impl UserPriceRange {
    /// First user entry is the highest priced one in descending data.
    pub fn locate(sequence: &[DisplayEntry], user_bands: &[Band]) -> Option<Self> {
        if user_bands.is_empty() {
            return None;
        }
        let user_ids: HashSet<i64> = user_bands.iter().map(|b| b.index).collect();
        let is_user = |entry: &&DisplayEntry| entry.band_index().is_some_and(|n| user_ids.contains(&n));

        let upper = sequence.iter().find(is_user)?.price_bounds()?;
        let lower = sequence.iter().rev().find(is_user)?.price_bounds()?;

        Some(Self {
            upper_price_up: upper.up,
            upper_median: upper.median(),
            lower_price_down: lower.down,
            lower_median: lower.median(),
        })
    }
}

/// The position's top band sits within two bands of the oracle band.
pub fn is_user_close_to_liquidation(user_first_band: i64, oracle_price_band: Option<i64>) -> bool {
    oracle_price_band.is_some_and(|oracle| user_first_band <= oracle.saturating_add(2))
}
