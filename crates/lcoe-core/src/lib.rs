//! Levelized Cost of Electricity engine for assets with a multi-year build.
//!
//! Pipeline: [`wacc`] blends real costs of capital into nominal rates,
//! [`construction`] rolls the drawdown and interest during construction up to
//! start-of-construction and commercial-operation values, [`discount_factors`]
//! builds the operating-year discount sequence, and [`lcoe`] / [`turnkey`]
//! turn those into a decomposed cost per MWh. [`methodology`] maps the
//! step selector and toggles onto that pipeline.

pub mod construction;
pub mod discount_factors;
pub mod error;
pub mod lcoe;
pub mod methodology;
pub mod time_value;
pub mod turnkey;
pub mod types;
pub mod wacc;

pub use error::LcoeError;
pub use types::*;

/// Standard result type for the envelope-level LCOE operations
pub type EngineResult<T> = Result<T, LcoeError>;
