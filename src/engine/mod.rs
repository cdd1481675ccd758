/// Declarative filter engine: evaluate filter conditions against the
/// dataset, post-process the matches, persist named views.
///
/// ```text
///   filters.json
///        │
///        ▼
///   ┌──────────┐
///   │   expr    │  condition string → Predicate → matching records
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  augment → sort → limit → sanitize → NamedView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ generate  │  run every definition, write output/json/*.json
///   └──────────┘
/// ```
pub mod expr;
pub mod generate;
pub mod pipeline;
