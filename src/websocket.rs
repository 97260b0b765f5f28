use crate::service::PlateCheck;
use crate::types::PlateCheckResponse;
use failure::Fail;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

#[derive(Debug, Fail)]
pub enum SessionError {
    #[fail(display = "Websocket receive failed: {}", _0)]
    Receive(#[fail(cause)] warp::Error),
    #[fail(display = "Websocket send failed: {}", _0)]
    Send(#[fail(cause)] warp::Error),
    #[fail(display = "Failed to encode response: {}", _0)]
    Encode(#[fail(cause)] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    AwaitingMessage,
    Processing,
    Closed,
}

impl SessionState {
    pub fn can_advance(self, to: SessionState) -> bool {
        use SessionState::*;
        match (self, to) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Open, AwaitingMessage) => true,
            (AwaitingMessage, Processing) => true,
            (Processing, AwaitingMessage) => true,
            _ => false,
        }
    }
}

struct Session {
    id: String,
    state: SessionState,
}

impl Session {
    fn open() -> Self {
        Session {
            id: Uuid::new_v4().simple().to_string(),
            state: SessionState::Open,
        }
    }

    /// Moves to `to` if the transition is legal; illegal ones are logged and
    /// leave the state unchanged.
    fn advance(&mut self, to: SessionState) -> bool {
        if !self.state.can_advance(to) {
            error!(
                "Session {}: refusing transition {:?} -> {:?}",
                self.id, self.state, to
            );
            return false;
        }
        debug!("Session {}: {:?} -> {:?}", self.id, self.state, to);
        self.state = to;
        true
    }
}

pub fn encode(response: &PlateCheckResponse) -> Result<Message, SessionError> {
    serde_json::to_string(response)
        .map(Message::text)
        .map_err(SessionError::Encode)
}

/// Serves one upgraded connection until the peer leaves or the transport
/// fails. Messages are handled strictly one at a time.
pub async fn handle_connection(mut socket: WebSocket, service: Arc<PlateCheck>) {
    let mut session = Session::open();
    info!("Handling websocket session {}", session.id);
    service.metrics().connection_opened();
    session.advance(SessionState::AwaitingMessage);

    match serve(&mut socket, &service, &mut session).await {
        Ok(()) => info!("Websocket session {} ended by peer", session.id),
        Err(e) => error!("Websocket session {} dropped: {}", session.id, e),
    }

    session.advance(SessionState::Closed);
    if let Err(e) = socket.close().await {
        debug!("Websocket session {} close: {}", session.id, e);
    }
    service.metrics().connection_closed();
}

async fn serve(
    socket: &mut WebSocket,
    service: &PlateCheck,
    session: &mut Session,
) -> Result<(), SessionError> {
    while let Some(frame) = socket.next().await {
        let message = frame.map_err(SessionError::Receive)?;
        if message.is_close() {
            debug!("Websocket close message: {:?}", message);
            return Ok(());
        }
        if message.is_ping() || message.is_pong() {
            continue;
        }

        session.advance(SessionState::Processing);
        let response = service.handle(message.as_bytes()).await;
        socket
            .send(encode(&response)?)
            .await
            .map_err(SessionError::Send)?;
        session.advance(SessionState::AwaitingMessage);
    }
    Ok(())
}
