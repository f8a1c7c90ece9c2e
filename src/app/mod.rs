pub mod bootstrap;
pub mod summary;

pub use bootstrap::{build_presets, execute, FetchJob};
pub use summary::{render_rows, summarize, SummaryRow};
