// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod runtime;
pub mod sensitivity;
pub mod session;
pub mod storage;
pub mod target;
