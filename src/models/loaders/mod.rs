pub mod template_loader;
pub mod toml_loader;

pub use template_loader::load_template;
pub use toml_loader::load_location_toml;
