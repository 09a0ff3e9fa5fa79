// WASM-specific implementations
pub mod http;
pub mod utils;

// Re-exports
pub use http::*;
pub use utils::*;
