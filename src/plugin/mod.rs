pub mod manifest;

pub use manifest::{PluginBasename, PluginPackage};
