use crate::table::Table;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use warp::ws::{Message, WebSocket, Ws};
use warp::Reply;

pub fn upgrade(ws: Ws, table: Arc<Table>) -> warp::reply::Response {
    ws.on_upgrade(move |socket| serve_socket(socket, table))
        .into_response()
}

/// Drives one client socket until it closes.
///
/// A writer task forwards the connection's queued messages to the socket
/// while this task feeds inbound text frames to the table.
pub async fn serve_socket(socket: WebSocket, table: Arc<Table>) {
    let (connection, inbox) = match table.connect() {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(error = %err, "refusing socket");
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();
    let mut outgoing = UnboundedReceiverStream::new(inbox);
    let writer_connection = connection.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outgoing.next().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(
                        connection_id = %writer_connection,
                        error = %err,
                        "failed to encode server message"
                    );
                    continue;
                }
            };
            if let Err(err) = sink.send(Message::text(text)).await {
                tracing::debug!(
                    connection_id = %writer_connection,
                    error = %err,
                    "socket write failed"
                );
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(connection_id = %connection, error = %err, "socket read failed");
                break;
            }
        };
        if frame.is_close() {
            break;
        }
        // Binary frames are ignored; ping/pong is answered by the socket.
        let Ok(text) = frame.to_str() else {
            continue;
        };
        if let Err(err) = table.handle_text(&connection, text) {
            tracing::error!(connection_id = %connection, error = %err, "closing socket");
            break;
        }
    }

    if let Err(err) = table.disconnect(&connection) {
        tracing::error!(connection_id = %connection, error = %err, "disconnect failed");
    }
    writer.abort();
}
