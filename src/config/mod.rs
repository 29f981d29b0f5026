// ==========================================
// Nutri Hospital - Configuration layer
// ==========================================
// Storage: config_kv table, compiled-in defaults for missing keys
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod import_settings;

pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportSettingsReader;
pub use import_settings::ImportSettings;
