//! Free-text ingestion: documents in, merge updates and change reports out.

pub mod parser;
pub mod report;

pub use parser::parse_document;
pub use report::{DiskReportSink, Report, ReportError, ReportSink};
