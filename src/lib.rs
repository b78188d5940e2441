// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires the terminal, logging and threads together.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod ingest;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod text;
pub mod ui;
pub mod util;
