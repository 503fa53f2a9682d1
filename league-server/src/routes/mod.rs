//! HTTP route handlers

pub mod league;
pub mod matches;
pub mod predictions;
pub mod status;
pub mod system;
pub mod teams;

use serde::Serialize;

/// Acknowledgement for operations with nothing else to return
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
