/// Data layer: core types, loading and the preprocessing stages.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table, repair + sort `timestamp`
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  expand   │  "[a, b, ...]" columns → name_0 .. name_{N-1}
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  coerce   │  text → bool-as-number / numeric
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  min-max scale numeric columns
///   └───────────┘
/// ```
///
/// Every stage takes `&Table` and returns a new `Table`.

pub mod coerce;
pub mod expand;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod timestamp;
