//! Shared application state for axum handlers.

use unibridge_app::handle::BridgeHandle;

use crate::board::CircuitBoard;

/// Application state shared across all axum handlers. Both halves are cheap
/// clones over shared state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Consumer intents go through here.
    pub handle: BridgeHandle,
    /// Exposed circuits, kept current by the bridge.
    pub board: CircuitBoard,
}

impl AppState {
    #[must_use]
    pub fn new(handle: BridgeHandle, board: CircuitBoard) -> Self {
        Self { handle, board }
    }
}
