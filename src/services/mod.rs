// ReadFocus services
// Services implement the reading features: extraction, ad hiding, themes, export, storage and state.

pub mod ad_suppressor;
pub mod browser_api;
pub mod config_loader;
pub mod content_extractor;
pub mod focus_store;
pub mod markdown_export;
pub mod storage;
pub mod theme_applier;
