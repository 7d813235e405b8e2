use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::hub::{Hub, Inbox};
use gang_engine::actions::Applied;
use gang_engine::player::ConnectionId;
use gang_engine::protocol::{decode_action, ServerMessage};
use gang_engine::state::GameStore;
use gang_engine::view::{project, ClientGameState};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use warp::http::StatusCode;

/// The one game this server hosts, plus the sockets watching it.
///
/// Every inbound event runs validate, mutate, check, project and enqueue
/// under a single lock acquisition, so snapshots reach every queue in the
/// same order the store changed.
#[derive(Debug)]
pub struct Table {
    store: Mutex<GameStore>,
    hub: Hub,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(GameStore::new())
    }
}

impl Table {
    pub fn new(store: GameStore) -> Self {
        Self {
            store: Mutex::new(store),
            hub: Hub::new(),
        }
    }

    /// A table dealing from `seed` when given, from entropy otherwise.
    pub fn with_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(GameStore::with_seed(seed)),
            None => Self::default(),
        }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Registers a fresh, unbound connection and queues its first snapshot.
    pub fn connect(&self) -> Result<(ConnectionId, Inbox), TableError> {
        let connection = ConnectionId::generate();
        let mut store = self.lock()?;
        store.connect(connection.clone());
        let inbox = self.hub.register(connection.clone());
        self.hub
            .send(&connection, ServerMessage::state(project(&store, &connection)));

        tracing::info!(connection_id = %connection, "client connected");
        Ok((connection, inbox))
    }

    /// Handles one inbound text frame from `connection`.
    ///
    /// Undecodable frames and rejected actions are answered to the sender
    /// only; anything that changed the store is broadcast to everyone.
    pub fn handle_text(&self, connection: &ConnectionId, text: &str) -> Result<(), TableError> {
        let action = match decode_action(text) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(connection_id = %connection, error = %err, "undecodable frame");
                self.hub.send(connection, ServerMessage::from(&err));
                return Ok(());
            }
        };

        let kind = action.kind();
        let mut store = self.lock()?;
        match store.apply(connection, action) {
            Ok(applied) => {
                tracing::debug!(connection_id = %connection, action = kind, "action applied");
                log_applied(connection, &applied);
                self.broadcast(&store);
            }
            Err(err) => {
                tracing::warn!(
                    connection_id = %connection,
                    action = kind,
                    error = %err,
                    "action rejected"
                );
                self.hub.send(connection, ServerMessage::from(&err));
            }
        }
        Ok(())
    }

    /// Forgets `connection` and tells everyone else what changed.
    pub fn disconnect(&self, connection: &ConnectionId) -> Result<(), TableError> {
        let mut store = self.lock()?;
        let vacated = store.disconnect(connection);
        self.hub.unregister(connection);

        match vacated {
            Some(player_id) => tracing::info!(
                connection_id = %connection,
                player_id = %player_id,
                "client disconnected, lobby seat vacated"
            ),
            None => tracing::info!(connection_id = %connection, "client disconnected"),
        }
        self.broadcast(&store);
        Ok(())
    }

    /// The table as seen by someone who has not joined.
    pub fn overview(&self) -> Result<ClientGameState, TableError> {
        let store = self.lock()?;
        Ok(project(&store, &ConnectionId::from("")))
    }

    fn broadcast(&self, store: &GameStore) {
        let mut delivered = 0usize;
        for connection in store.connections() {
            if self
                .hub
                .send(connection, ServerMessage::state(project(store, connection)))
            {
                delivered += 1;
            }
        }
        tracing::debug!(delivered, phase = ?store.phase(), "state broadcast");
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameStore>, TableError> {
        self.store.lock().map_err(|_| {
            tracing::error!("table lock poisoned");
            TableError::Poisoned
        })
    }
}

fn log_applied(connection: &ConnectionId, applied: &Applied) {
    match applied {
        Applied::Joined { player_id } => {
            tracing::info!(connection_id = %connection, player_id = %player_id, "player joined")
        }
        Applied::GameStarted { players } => tracing::info!(players, "game started"),
        Applied::RoundAdvanced { round } => {
            tracing::info!(round = round.number(), "round advanced")
        }
        Applied::GameFinished => tracing::info!("game finished, hole cards revealed"),
        Applied::Reset => tracing::info!(connection_id = %connection, "game reset to lobby"),
        Applied::Updated => {}
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table state poisoned")]
    Poisoned,
}

impl IntoErrorResponse for TableError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_code(&self) -> &'static str {
        "table_unavailable"
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}
