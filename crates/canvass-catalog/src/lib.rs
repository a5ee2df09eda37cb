//! Canvass Catalog — multi-language dropdown taxonomies and the
//! tenant settings store.

pub mod dropdown;
pub mod settings;

pub use dropdown::{CreateOptionInput, DropdownService, LocalizedOption, UpdateOptionInput};
pub use settings::{FileUpload, SettingView, SettingsService};
