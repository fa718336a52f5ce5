// Shared type definitions.
// Each submodule defines types used across the extension.

pub mod article;
pub mod config;
pub mod errors;
pub mod focus;
pub mod message;
pub mod storage;
pub mod tab;
pub mod theme;
