//! Server state management

use league_core::Season;

/// Server-wide shared state
pub struct ServerState {
    pub season: Season,
}

impl ServerState {
    pub fn new(season: Season) -> Self {
        Self { season }
    }
}
