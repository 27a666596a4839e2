//! Background reminder delivery.

mod config;
mod dispatcher;

pub use config::DispatchConfig;
pub use dispatcher::{Dispatcher, TickReport};
