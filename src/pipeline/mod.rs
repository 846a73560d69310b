/// Signal-processing pipeline.
///
/// Every function here is pure: it reads slices and returns new values.
/// Callers own the series and decide when to recompute.
///
/// ```text
///   Series.y ──► smooth ──┐
///                         ├──► processed y ──► peaks::detect ──► Vec<Peak>
///   Series.y ──► baseline ┘                                        │
///                                                                  ▼
///                               gaussian::estimate ──► gaussian::refine
/// ```

pub mod baseline;
pub mod gaussian;
pub mod metrics;
pub mod peaks;
pub mod smooth;

pub use baseline::PolynomialBaseline;
pub use gaussian::RefineOptions;
pub use smooth::smooth;
