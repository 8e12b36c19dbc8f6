use crate::market_data::client::FetchError;

/// One row of the displayed market strip.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketItem {
    pub key: String,
    pub label: String,
    /// Last good price. Only ever replaced by a successful fetch.
    pub value: f64,
    /// Percent delta since the previous good price, rounded to 2 decimal
    /// places. 0.0 until a second successful observation exists.
    pub change: f64,
}

/// What the presentation layer consumes. Replaced wholesale by the
/// refresher on every tick; consumers never edit it in place.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Items in selection order.
    pub items: Vec<MarketItem>,
    /// True while a tick's fan-out is outstanding.
    pub loading: bool,
    /// Last tick-level failure, if the orchestration itself failed.
    /// Per-symbol failures are absorbed and never show up here.
    pub error: Option<String>,
}

/// Failure-visibility event, emitted per failed symbol when an observer
/// channel is attached to the refresher.
#[derive(Debug)]
pub struct FetchFailure {
    pub key: String,
    pub symbol: String,
    pub error: FetchError,
}
