/// Data layer: core types, loading, and interactive filtering.
///
/// Architecture:
/// ```text
///  players.csv / view .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed cells, mtime cache)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, per-column kinds / bounds / uniques
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState + derived controls → visible indices
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
