//! Core types and process-wide state.

mod mode;
mod state;

pub use mode::BuildMode;
pub use state::{
    is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler,
};
