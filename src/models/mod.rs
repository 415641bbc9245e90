pub mod loaders;
pub mod location;
pub mod rename;
pub mod selection;

pub use loaders::{load_location_toml, load_template};
pub use location::{LocationFile, LocationKey, TargetCheck};
pub use rename::{CandidateFile, RenameReport, RenameResult};
pub use selection::{sanitize_identifier, PlateSelection};
