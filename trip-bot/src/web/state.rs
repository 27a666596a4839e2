//! Application state for the web layer.

use std::sync::Arc;

use crate::bot::Controller;
use crate::channel::SharedChannel;
use crate::stations::StationDirectory;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The booking conversation
    pub controller: Controller,

    /// Station catalog for lookups
    pub stations: Arc<StationDirectory>,

    /// Where replies are delivered
    pub channel: SharedChannel,
}

impl AppState {
    pub fn new(
        controller: Controller,
        stations: Arc<StationDirectory>,
        channel: SharedChannel,
    ) -> Self {
        Self {
            controller,
            stations,
            channel,
        }
    }
}
