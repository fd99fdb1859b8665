/// Data layer: acquisition, tables, filtering and chart reshaping.
///
/// Architecture:
/// ```text
///   remote .sqlite archive (https:// or file://)
///        │
///        ▼
///   ┌──────────┐
///   │  fetch    │  GET → opaque bytes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stage    │  bytes → temp file → read-only SQLite store (removed on drop)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐     ┌─────────┐
///   │  loader   │ ◄──►│  cache  │  memoized per (operation, arguments)
///   └──────────┘     └─────────┘
///        │  wrapped by retry::Retrying (bounded, backoff)
///        ▼
///   ┌─────────────┐
///   │ ResultTable  │  columns + rows, release_date normalized
///   └─────────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │  filter / analysis  │  selections, rankings, summaries → UI
///   └────────────────────┘
/// ```

pub mod analysis;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod queries;
pub mod retry;
pub mod stage;
