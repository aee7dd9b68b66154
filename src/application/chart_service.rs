use crate::{
    application::{sequence_memo::SequenceMemo, settings::ChartSettings},
    domain::{
        bands::{
            ActiveWindowTrimmer, Band, DisplayEntry, UserPriceRange, ZoomRangePlanner,
            is_user_close_to_liquidation,
        },
        chart::{BrushRange, ChartView, IndexRange, ZoomWindow, ZoomWindowController},
        logging::{LogComponent, get_logger},
    },
    log_debug,
};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::rc::Rc;

/// Application service: one bands chart instance.
///
/// Owns the memoized sequences and the zoom controller for the lifetime of the
/// chart. Data may be replaced at any time; `chart_options` reads the market sequence
/// and the user bands together, so the zoom percentages always match the
/// sequence they are applied to.
pub struct BandsChartService {
    settings: ChartSettings,
    planner: ZoomRangePlanner,
    market_bands: Vec<Band>,
    user_bands: Vec<Band>,
    oracle_price_band: Option<i64>,
    oracle_price: Option<f64>,
    initial_zoom_indices: Option<IndexRange>,
    market_memo: SequenceMemo,
    user_memo: SequenceMemo,
    market_view: Rc<[DisplayEntry]>,
    market_generation: u64,
    zoom: ZoomWindowController,
}

impl Default for BandsChartService {
    fn default() -> Self {
        Self::new(ChartSettings::default())
    }
}

impl BandsChartService {
    pub fn new(settings: ChartSettings) -> Self {
        Self {
            settings,
            planner: ZoomRangePlanner::new(settings.zoom_padding_bands),
            market_bands: Vec::new(),
            user_bands: Vec::new(),
            oracle_price_band: None,
            oracle_price: None,
            initial_zoom_indices: None,
            market_memo: SequenceMemo::new(),
            user_memo: SequenceMemo::new(),
            market_view: Rc::from(Vec::<DisplayEntry>::new()),
            market_generation: 0,
            zoom: ZoomWindowController::new(),
        }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Replace the market-wide bands and the oracle band.
    pub fn update_market(&mut self, bands: Vec<Band>, oracle_price_band: Option<i64>) {
        self.market_bands = bands;
        self.oracle_price_band = oracle_price_band;
        self.refresh_market_view();
    }

    /// Replace the bands of the user's position.
    pub fn update_user(&mut self, bands: Vec<Band>) {
        self.user_bands = bands;
    }

    pub fn set_oracle_price(&mut self, oracle_price: Option<f64>) {
        self.oracle_price = oracle_price.filter(|price| price.is_finite());
    }

    /// Host-computed zoom range; takes precedence over the planner.
    pub fn set_initial_zoom_indices(&mut self, range: Option<IndexRange>) {
        self.initial_zoom_indices = range;
    }

    fn refresh_market_view(&mut self) {
        let full = self.market_memo.get_or_build(&self.market_bands, self.oracle_price_band);
        if self.market_memo.generation() == self.market_generation {
            return;
        }
        self.market_generation = self.market_memo.generation();
        self.market_view = if self.settings.trim_market_view {
            Rc::from(ActiveWindowTrimmer::trim(&full))
        } else {
            full
        };
        // a brush selection indexes into the old sequence
        self.zoom.reset_brush();

        log_debug!(
            LogComponent::Application("BandsChart"),
            "market view rebuilt: {} of {} entries",
            self.market_view.len(),
            self.market_bands.len()
        );
    }

    /// Market view, trimmed unless the settings say otherwise.
    pub fn market_sequence(&self) -> Rc<[DisplayEntry]> {
        Rc::clone(&self.market_view)
    }

    /// The position's bands with the oracle marker, never trimmed.
    pub fn user_sequence(&mut self) -> Rc<[DisplayEntry]> {
        self.user_memo.get_or_build(&self.user_bands, self.oracle_price_band)
    }

    pub fn sequence(&mut self, view: ChartView) -> Rc<[DisplayEntry]> {
        match view {
            ChartView::Market => self.market_sequence(),
            ChartView::User => self.user_sequence(),
        }
    }

    /// Run the zoom controller against the current market view and user bands.
    pub fn evaluate_zoom(&mut self) -> bool {
        let sequence = Rc::clone(&self.market_view);
        let user_ids: HashSet<i64> = self.user_bands.iter().map(|band| band.index).collect();

        // user bands that are not on the chart yet leave the zoom not ready
        let range = self
            .initial_zoom_indices
            .filter(|range| range.start_index <= range.end_index && range.end_index < sequence.len())
            .or_else(|| {
                ZoomRangePlanner::user_indices(&sequence, &self.user_bands)
                    .and_then(|_| self.planner.initial_zoom_indices(&sequence, &self.user_bands, self.oracle_price))
            });

        self.zoom.evaluate(sequence.len(), &user_ids, range)
    }

    /// Chart options for this pass: zoom controls when the sequence is long
    /// enough, plus a freshly computed window if one is pending.
    pub fn chart_options(&mut self, base_options: Value) -> Value {
        let mut options = base_options;
        if self.market_view.len() > self.settings.brush_window {
            insert_default_zoom_controls(&mut options);
        }

        self.evaluate_zoom();
        if self.zoom.apply(&mut options) {
            get_logger().info(
                LogComponent::Application("BandsChart"),
                &format!("🔍 Auto-zoom applied: {:?}", self.zoom.current_window()),
            );
        }
        options
    }

    /// `datazoom` event from the chart.
    pub fn record_user_zoom(&mut self, start: f64, end: f64) {
        if start.is_finite() && end.is_finite() {
            self.zoom.record_user_zoom(ZoomWindow::new(start, end));
        }
    }

    pub fn set_brush_range(&mut self, brush: BrushRange) {
        self.zoom.set_brush_range(brush);
    }

    pub fn brush_range(&self) -> BrushRange {
        self.zoom.brush_range()
    }

    pub fn zoom(&self) -> &ZoomWindowController {
        &self.zoom
    }

    pub fn user_price_range(&self) -> Option<UserPriceRange> {
        UserPriceRange::locate(&self.market_view, &self.user_bands)
    }

    /// Measured from the user's lowest band index, the first one the oracle reaches.
    pub fn is_user_close_to_liquidation(&self) -> bool {
        self.user_bands
            .iter()
            .map(|band| band.index)
            .min()
            .is_some_and(|first| is_user_close_to_liquidation(first, self.oracle_price_band))
    }
}

/// Vertical slider plus wheel zoom on the band axis, unless the host set its own.
fn insert_default_zoom_controls(options: &mut Value) {
    let Some(fields) = options.as_object_mut() else {
        return;
    };
    if fields.get("dataZoom").is_some_and(Value::is_array) {
        return;
    }
    fields.insert(
        "dataZoom".to_string(),
        json!([
            {
                "type": "slider",
                "yAxisIndex": 0,
                "orient": "vertical",
                "brushSelect": false,
                "showDataShadow": false,
                "zoomLock": false,
                "moveOnMouseMove": true,
                "moveOnMouseWheel": true
            },
            {
                "type": "inside",
                "yAxisIndex": 0,
                "orient": "vertical",
                "zoomOnMouseWheel": "shift",
                "moveOnMouseWheel": true
            }
        ]),
    );
}
