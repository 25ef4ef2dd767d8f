// Core contract exports
pub mod analytics;
pub mod currency;
pub mod encoding;
pub mod features;
pub mod predictor;

pub use currency::{convert, currency_options, ConversionError, ExchangeRateTable, RateSource};
pub use encoding::{label_to_code, labels, EncodingError, Schema, UNSELECTED};
pub use features::{build, FeatureError, FeatureVector, Selection, Selections};
pub use predictor::{ModelError, ModelState, PredictionError, Predictor, Regressor};
