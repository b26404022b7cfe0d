//! Adapters between the aggregation core and the outside world.
//!
//! - `signals`: the three signal sources behind [`SignalAdapter`](crate::domain::ports::SignalAdapter)
//! - `http`: the `POST /` check endpoint

pub mod http;
pub mod signals;
