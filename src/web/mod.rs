pub mod api;
pub mod server;

pub use api::{AppState, BatchReceipt};
pub use server::{build_router, run_server};
