pub mod assembler;
pub mod config;
pub mod csv;
pub mod enricher;
pub mod generator;

pub use assembler::{BranchStatus, ReportAssembler, ReportMode, ReportRow, DEFAULT_STALE_DAYS};
pub use config::ReportSettings;
pub use csv::CsvWriter;
pub use enricher::{BranchEnricher, BranchOutcome, DegradedRecord, EnrichedBranchRecord};
pub use generator::{GeneratedReport, ReportGenerator};
