/// Data layer: core types and scan loading.
///
/// Architecture:
/// ```text
///  .asr / .xy / .txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse text → Series (sorted by 2θ)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Series   │  x / y, peaks and fits refer back by index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  smooth, baseline, peaks, gaussian
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
