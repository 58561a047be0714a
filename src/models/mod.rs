//! Data models for the quiz host.
//!
//! Field names serialize in camelCase for the polling clients.

mod command;
mod player;
mod question;
mod response;
mod state;
mod view;

pub use command::*;
pub use player::*;
pub use question::*;
pub use response::*;
pub use state::*;
pub use view::*;
