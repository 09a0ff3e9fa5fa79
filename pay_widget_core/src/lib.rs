// Pay Widget Core Library
// Platform-agnostic lifecycle controller for the hosted card-entry widget

pub mod config;
pub mod controller;
pub mod error;
pub mod lifetime;
pub mod ports;
pub mod query;
pub mod sdk;
pub mod secret;
pub mod state;
pub mod style;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

// Re-exports
pub use config::{BridgePayload, Configuration, WalletOption, WidgetProfile, WidgetSettings};
pub use controller::{Controller, Event, EventSender, Ports};
pub use error::{SdkError, WidgetError, WidgetResult};
pub use ports::*;
pub use query::QueryParams;
pub use sdk::*;
pub use state::{LifecycleFlags, Phase, PhaseChange};
pub use style::ButtonStyle;
