//! WebSocket host for the gang chip game.
//!
//! One [`Table`] owns the game store; every socket gets its own outbound
//! queue in the [`Hub`] and receives a fresh projection of the store after
//! each change.

pub mod errors;
pub mod handlers;
pub mod hub;
pub mod logging;
pub mod server;
pub mod settings;
pub mod static_handler;
pub mod table;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use hub::{Hub, Inbox, Outbox};
pub use logging::{LogEntry, TestLogSubscriber, init_logging};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer, routes};
pub use settings::{AppSettings, CONFIG_ENV, SettingsError, SettingsOverrides};
pub use static_handler::{StaticError, StaticHandler};
pub use table::{Table, TableError};
