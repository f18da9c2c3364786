//! External collaborators: prices, instruments and notifications.

pub mod binance;
pub mod instruments;
pub mod market_data;
pub mod notifier;

pub use binance::BinanceCandleProvider;
pub use instruments::{normalize_symbols, InstrumentSource, StaticInstruments, WatchlistInstruments};
pub use market_data::MarketDataProvider;
pub use notifier::{LogNotifier, NotificationSink, WebhookNotifier};
