//! Application state shared across all handlers.

use std::sync::Arc;

use chathub_auth::{AccessChecker, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use chathub_core::config::AppConfig;
use chathub_database::ChatStore;
use chathub_realtime::RealtimeEngine;
use chathub_service::{ConversationService, MessageService, RoomService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Persistence backend.
    pub store: Arc<dyn ChatStore>,
    /// Bearer token validation.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Accounts.
    pub user_service: Arc<UserService>,
    /// Chat rooms.
    pub room_service: Arc<RoomService>,
    /// Direct conversations.
    pub conversation_service: Arc<ConversationService>,
    /// Live sessions and fan-out.
    pub realtime: RealtimeEngine,
}

impl AppState {
    /// Wires every collaborator over one store.
    pub fn new(config: AppConfig, store: Arc<dyn ChatStore>) -> Self {
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let password_hasher = Arc::new(PasswordHasher::new());
        let password_validator = Arc::new(PasswordValidator::new(&config.auth));
        let access = Arc::new(AccessChecker::new(Arc::clone(&store)));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&store),
            password_hasher,
            password_validator,
            jwt_encoder,
        ));
        let room_service = Arc::new(RoomService::new(Arc::clone(&store), Arc::clone(&access)));
        let conversation_service = Arc::new(ConversationService::new(
            Arc::clone(&store),
            Arc::clone(&access),
        ));

        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            access,
            MessageService::new(Arc::clone(&store)),
        );

        Self {
            config: Arc::new(config),
            store,
            jwt_decoder,
            user_service,
            room_service,
            conversation_service,
            realtime,
        }
    }
}
