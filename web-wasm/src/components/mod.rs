pub mod auth;
pub mod comparison;
pub mod crop;
pub mod header;
pub mod home;
pub mod polyphenol;
pub mod predict;
pub mod progress_bar;
pub mod results;
pub mod results_table;
pub mod settings_panel;
pub mod super_dashboard;
pub mod upload_area;
