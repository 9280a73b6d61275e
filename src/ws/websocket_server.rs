use futures_util::{Sink, SinkExt, StreamExt};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::Message;

use super::page::{self, Route};
use super::protocol::{ClientMessage, ServerMessage};
use crate::controller::ControlCommand;
use crate::render::view::Readout;

const EVENT_CAPACITY: usize = 64;

pub type CommandSender = mpsc::UnboundedSender<ControlCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<ControlCommand>;

pub fn create_command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

/// Fan-out to browser clients.
///
/// Readouts only matter as the latest frame, so they sit in a watch channel
/// every new client reads on connect. Cues and alerts must all arrive and
/// travel on their own broadcast channel.
#[derive(Clone)]
pub struct Outbound {
    readouts: Arc<watch::Sender<Option<Readout>>>,
    events: broadcast::Sender<ServerMessage>,
}

impl Outbound {
    pub fn publish_readout(&self, readout: Readout) {
        self.readouts.send_replace(Some(readout));
    }

    /// Returns false when no client is connected.
    pub fn publish_event(&self, message: ServerMessage) -> bool {
        self.events.send(message).is_ok()
    }

    pub(crate) fn subscribe(
        &self,
    ) -> (watch::Receiver<Option<Readout>>, broadcast::Receiver<ServerMessage>) {
        (self.readouts.subscribe(), self.events.subscribe())
    }
}

pub fn create_outbound_channel() -> Outbound {
    Outbound {
        readouts: Arc::new(watch::channel(None).0),
        events: broadcast::channel(EVENT_CAPACITY).0,
    }
}

pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Timer server listening on: {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts browser clients until the listener fails. `/ws` upgrades to the
/// timer feed; everything else is answered by the host page module.
pub async fn serve(
    listener: TcpListener,
    command_tx: CommandSender,
    outbound: Outbound,
    assets_dir: PathBuf,
) {
    while let Ok((stream, peer_addr)) = listener.accept().await {
        let tx = command_tx.clone();
        let subscription = outbound.subscribe();
        let assets_dir = assets_dir.clone();
        tokio::spawn(async move {
            let route = match page::peek_route(&stream).await {
                Ok(route) => route,
                Err(e) => {
                    tracing::warn!("Failed to read request from {}: {}", peer_addr, e);
                    return;
                }
            };
            match route {
                Route::Socket => {
                    tracing::info!("New WebSocket connection from: {}", peer_addr);
                    let (readouts, events) = subscription;
                    handle_connection(stream, peer_addr, tx, readouts, events).await;
                }
                other => {
                    tracing::debug!(?other, "HTTP request from {}", peer_addr);
                    if let Err(e) = page::respond(stream, other, &assets_dir).await {
                        tracing::warn!("Failed to answer {}: {}", peer_addr, e);
                    }
                }
            }
        });
    }
}

async fn send_json(
    ws_sender: &mut (impl Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin),
    message: &ServerMessage,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    match serde_json::to_string(message) {
        Ok(json) => ws_sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to encode message: {}", e);
            Ok(())
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    command_tx: CommandSender,
    mut readouts: watch::Receiver<Option<Readout>>,
    mut events: broadcast::Receiver<ServerMessage>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake failed with {}: {}", peer_addr, e);
            return;
        }
    };

    tracing::debug!("WebSocket handshake completed with {}", peer_addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // a paused timer publishes nothing new, so draw the current frame now
    let current = readouts.borrow_and_update().clone();
    if let Some(readout) = current {
        if let Err(e) = send_json(&mut ws_sender, &ServerMessage::Readout(readout)).await {
            tracing::warn!("Failed to send first readout to {}: {}", peer_addr, e);
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = ws_receiver.next() => {
                let Some(msg) = incoming else { break };
                match msg {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Toggle) => {
                                tracing::debug!("[WebSocket] toggle from {}", peer_addr);
                                if let Err(e) = command_tx.send(ControlCommand::Toggle) {
                                    tracing::warn!("Failed to forward toggle: {}", e);
                                }
                                None
                            }
                            Ok(ClientMessage::Ping) => Some(ServerMessage::Pong),
                            Err(e) => {
                                tracing::warn!("Failed to parse message: {}", e);
                                Some(ServerMessage::Error {
                                    message: format!("Parse error: {}", e),
                                })
                            }
                        };
                        if let Some(reply) = reply {
                            if let Err(e) = send_json(&mut ws_sender, &reply).await {
                                tracing::warn!("Failed to send WebSocket response: {}", e);
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("WebSocket connection closed by {}", peer_addr);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                            tracing::warn!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("WebSocket error from {}: {}", peer_addr, e);
                        break;
                    }
                }
            }
            changed = readouts.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = readouts.borrow_and_update().clone();
                if let Some(readout) = latest {
                    if let Err(e) = send_json(&mut ws_sender, &ServerMessage::Readout(readout)).await {
                        tracing::warn!("Failed to push to {}: {}", peer_addr, e);
                        break;
                    }
                }
            }
            pushed = events.recv() => {
                match pushed {
                    Ok(message) => {
                        if let Err(e) = send_json(&mut ws_sender, &message).await {
                            tracing::warn!("Failed to push to {}: {}", peer_addr, e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("{} lagged, dropped {} cues or alerts", peer_addr, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::info!("WebSocket connection with {} terminated", peer_addr);
}
