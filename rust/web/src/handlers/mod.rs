pub mod health;
pub mod state;
pub mod ws;

pub use health::health;
pub use state::table_state;
pub use ws::{serve_socket, upgrade};
