//! Validator (§4.5): recursive chain verification with memoization,
//! producing a flat report renderable as CSV or HTML (§6.3).

pub mod check;
pub mod report;
pub mod writer;

pub use check::Validator;
pub use report::ReportEntry;
pub use writer::{render_csv, render_html, write_report, ReportFormat};

pub type Result<T> = std::result::Result<T, provtool_core::ProvtoolError>;
