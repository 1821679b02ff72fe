//! WebSocket Event Stream
//!
//! Pushes panel events to the photo portal webapp and accepts LED commands.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks connections and broadcasts events in order
//! - **Handler**: Handles WebSocket upgrade, initial state and inbound frames
//! - **Messages**: Defines client and server message formats
//!
//! ## Protocol
//!
//! On connect the server sends the current `MAP_TOGGLE` position and
//! `ZOOM_DIAL` value, then one frame per panel event:
//!
//! ```text
//! {"type":"LIKE_BUTTON"}
//! {"type":"MESSAGE_BUTTON"}
//! {"type":"METADATA_TOGGLE"}
//! {"type":"MAP_TOGGLE","value":"ON"}
//! {"type":"ZOOM_DIAL","value":0.42}
//! ```
//!
//! Clients control the LED with `{"type":"LED","value":"ON"}`, `"OFF"`, or a
//! brightness between 0 and 1. Frames that cannot be handled are answered
//! with `{"type":"ERROR","message":...}`.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8765');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'LIKE_BUTTON') likePhoto();
//! };
//!
//! ws.send(JSON.stringify({type: 'LED', value: 'ON'}));
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
