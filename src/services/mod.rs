pub mod argument_template;
pub mod config_resolver;
pub mod csv_merger;
pub mod file_renamer;

pub use argument_template::{ArgumentBuilder, ArgumentTemplate};
pub use config_resolver::{resolve, ConfigResolver, LocationSource};
pub use csv_merger::{CsvMerger, MergeOutcome};
pub use file_renamer::FileRenamer;
