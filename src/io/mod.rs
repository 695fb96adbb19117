//! Everything that leaves the process: snapshots, reports and DOI lookups.

pub mod doi;
pub mod output;
pub mod render;
pub mod store;

pub use doi::{DoiCache, fetch_doi};
pub use output::{BibTeXOutput, CollectorSummary, OutputKind, ReportOptions, TextOutput, collate};
pub use render::Style;
pub use store::{load_collector, save_collector};
