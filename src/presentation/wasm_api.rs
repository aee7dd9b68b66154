use std::str::FromStr;
use wasm_bindgen::prelude::*;

use crate::application::{BandsChartService, ChartSettings};
use crate::domain::{
    bands::{ActiveWindowTrimmer, Band, BandSequenceBuilder},
    chart::{BrushRange, ChartView, IndexRange},
    errors::{AppError, AppResult},
    logging::LogComponent,
};
use crate::{log_error, log_warn};

/// WASM API for the JavaScript host.
///
/// Thin bridge: JSON strings in, JSON strings out, everything else lives in
/// `BandsChartService`.
#[wasm_bindgen]
pub struct BandsChartApi {
    service: BandsChartService,
}

#[wasm_bindgen]
impl BandsChartApi {
    /// `settings_json` may be omitted or partial, e.g. `{"brushWindow": 30}`.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<BandsChartApi, JsValue> {
        let settings = match settings_json.as_deref() {
            Some(json) => ChartSettings::from_json(json).map_err(to_js_error)?,
            None => ChartSettings::default(),
        };
        Ok(Self { service: BandsChartService::new(settings) })
    }

    #[wasm_bindgen(js_name = setMarketBands)]
    pub fn set_market_bands(&mut self, bands_json: &str, oracle_price_band: Option<f64>) -> Result<(), JsValue> {
        let bands = decode_bands(bands_json).map_err(to_js_error)?;
        self.service.update_market(bands, band_from_js(oracle_price_band));
        Ok(())
    }

    #[wasm_bindgen(js_name = setUserBands)]
    pub fn set_user_bands(&mut self, bands_json: &str) -> Result<(), JsValue> {
        let bands = decode_bands(bands_json).map_err(to_js_error)?;
        self.service.update_user(bands);
        Ok(())
    }

    #[wasm_bindgen(js_name = setOraclePrice)]
    pub fn set_oracle_price(&mut self, oracle_price: Option<f64>) {
        self.service.set_oracle_price(oracle_price);
    }

    /// Both ends or neither; a range that does not fit the sequence is ignored.
    #[wasm_bindgen(js_name = setInitialZoomIndices)]
    pub fn set_initial_zoom_indices(&mut self, start_index: Option<u32>, end_index: Option<u32>) {
        let range = start_index
            .zip(end_index)
            .map(|(start, end)| IndexRange::new(start as usize, end as usize));
        self.service.set_initial_zoom_indices(range);
    }

    /// `view` is `"market"` or `"user"`.
    #[wasm_bindgen(js_name = displaySequence)]
    pub fn display_sequence(&mut self, view: &str) -> Result<String, JsValue> {
        let view = ChartView::from_str(view)
            .map_err(|_| to_js_error(AppError::ValidationError(format!("unknown chart view {:?}", view))))?;
        let sequence = self.service.sequence(view);
        serde_json::to_string(&*sequence).map_err(|e| to_js_error(e.into()))
    }

    /// Merge zoom controls and any pending auto-zoom into the host's options.
    #[wasm_bindgen(js_name = chartOptions)]
    pub fn chart_options(&mut self, base_options_json: &str) -> Result<String, JsValue> {
        let base = serde_json::from_str(base_options_json).map_err(|e| to_js_error(e.into()))?;
        let options = self.service.chart_options(base);
        serde_json::to_string(&options).map_err(|e| to_js_error(e.into()))
    }

    #[wasm_bindgen(js_name = onDataZoom)]
    pub fn on_data_zoom(&mut self, start: f64, end: f64) {
        self.service.record_user_zoom(start, end);
    }

    #[wasm_bindgen(js_name = setBrushRange)]
    pub fn set_brush_range(&mut self, start_index: Option<u32>, end_index: Option<u32>) {
        self.service.set_brush_range(BrushRange::new(
            start_index.map(|i| i as usize),
            end_index.map(|i| i as usize),
        ));
    }

    #[wasm_bindgen(js_name = brushRange)]
    pub fn brush_range(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.service.brush_range()).map_err(|e| to_js_error(e.into()))
    }

    /// `null` until the user's bands are on the market chart with known prices.
    #[wasm_bindgen(js_name = userPriceRange)]
    pub fn user_price_range(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.service.user_price_range()).map_err(|e| to_js_error(e.into()))
    }

    #[wasm_bindgen(js_name = isUserCloseToLiquidation)]
    pub fn is_user_close_to_liquidation(&self) -> bool {
        self.service.is_user_close_to_liquidation()
    }
}

/// One-shot build (and optional trim) without a chart instance.
#[wasm_bindgen(js_name = buildDisplaySequence)]
pub fn build_display_sequence(bands_json: &str, oracle_price_band: Option<f64>, trim: bool) -> Result<String, JsValue> {
    let bands = decode_bands(bands_json).map_err(to_js_error)?;
    let sequence = BandSequenceBuilder::build(&bands, band_from_js(oracle_price_band));
    let visible = if trim { ActiveWindowTrimmer::trim(&sequence) } else { &sequence[..] };
    serde_json::to_string(visible).map_err(|e| to_js_error(e.into()))
}

/// Decode and sanity-check a band array coming from the data layer.
pub fn decode_bands(bands_json: &str) -> AppResult<Vec<Band>> {
    let bands: Vec<Band> = serde_json::from_str(bands_json)?;
    BandSequenceBuilder::validate(&bands)?;
    Ok(bands)
}

/// JS numbers carry band indices; anything that is not a whole number means "no band".
pub fn band_from_js(value: Option<f64>) -> Option<i64> {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        Some(v) => {
            log_warn!(LogComponent::Presentation("BandsChartApi"), "ignoring oracle band {}", v);
            None
        }
        None => None,
    }
}

fn to_js_error(error: AppError) -> JsValue {
    log_error!(LogComponent::Presentation("BandsChartApi"), "{}", error);
    JsValue::from_str(&error.to_string())
}
