// ReadFocus managers
// Managers own running state: page contexts, the tab strip, the background hub and the popup.

pub mod background;
pub mod content_script;
pub mod popup;
pub mod tab_host;
