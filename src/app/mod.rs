// ==========================================
// Nutri Hospital - Application layer
// ==========================================
// Wires the shared connection into the APIs used by the CLI
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
