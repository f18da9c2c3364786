use crate::models::indicators::IndicatorFrame;
use crate::models::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete WaveTrend events recognised on a single bar.
///
/// Declaration order is evaluation order; a bar may carry several kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    GreenCircle,
    GoldCircle,
    RedCircle,
    PurpleTriangle,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::GreenCircle => "green_circle",
            SignalKind::GoldCircle => "gold_circle",
            SignalKind::RedCircle => "red_circle",
            SignalKind::PurpleTriangle => "purple_triangle",
        }
    }
}

/// Rules spanning two independently computed timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeCondition {
    ShortTermDowntrend,
    OversoldBounce,
}

impl CompositeCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeCondition::ShortTermDowntrend => "short_term_downtrend",
            CompositeCondition::OversoldBounce => "oversold_bounce",
        }
    }
}

/// Rules evaluated on one timeframe's latest closed bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenCondition {
    BuyOpportunity,
    RsiExtremeOversold,
}

impl ScreenCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenCondition::BuyOpportunity => "buy_opportunity",
            ScreenCondition::RsiExtremeOversold => "rsi_extreme_oversold",
        }
    }
}

/// Rules that must hold on every one of several timeframes at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfluenceCondition {
    PerfectBuy,
    GreatBuy,
    ShortTermUptrend,
}

impl ConfluenceCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfluenceCondition::PerfectBuy => "perfect_buy",
            ConfluenceCondition::GreatBuy => "great_buy",
            ConfluenceCondition::ShortTermUptrend => "short_term_uptrend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum AlertKind {
    Signal(SignalKind),
    Composite(CompositeCondition),
    Screen(ScreenCondition),
    Confluence(ConfluenceCondition),
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Signal(kind) => kind.as_str(),
            AlertKind::Composite(condition) => condition.as_str(),
            AlertKind::Screen(condition) => condition.as_str(),
            AlertKind::Confluence(condition) => condition.as_str(),
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedup identity: at most one alert per key for the life of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub symbol: String,
    /// Timeframe whose bar `bar_timestamp` refers to.
    pub timeframe: Timeframe,
    pub kind: AlertKind,
    pub bar_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub timeframe: Timeframe,
    pub frame: IndicatorFrame,
}

/// A detection that passed dedup, ready for the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub symbol: String,
    pub timeframes: Vec<Timeframe>,
    pub kind: AlertKind,
    pub bar_timestamp: DateTime<Utc>,
    pub snapshot: Vec<FrameSnapshot>,
    pub detected_at: DateTime<Utc>,
}
