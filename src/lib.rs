//! # rusty-xrd
//!
//! Load X-ray diffraction scans (`.asr` two-column 2θ / intensity text),
//! subtract a polynomial background, smooth, pick peaks and fit a Gaussian
//! to one of them.
//!
//! * [`data`] – scan types and the text parser
//! * [`pipeline`] – the pure numerical steps
//! * [`state`] – the session object a front end drives
//! * [`endpoint`] – the server-side refine handler
//! * [`export`] – JSON session snapshot and CSV peak table

pub mod config;
pub mod data;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod state;

pub use config::ProcessingSettings;
pub use data::model::{GaussianParams, Peak, SelectedPeak, Series};
pub use error::{EndpointError, ParseError};
pub use state::AppState;
