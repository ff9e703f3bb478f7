pub mod json_results;
pub mod report;

pub use json_results::ResultsWriter;
pub use report::{print_box, print_report, print_summary, print_warnings, RunSummary};
