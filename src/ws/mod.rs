pub mod page;
pub mod protocol;
pub mod websocket_server;
