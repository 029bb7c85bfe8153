//! Live socket sessions: handles, the session pool, and keepalive.

pub mod handle;
pub mod heartbeat;
pub mod pool;
pub mod state;

pub use handle::{OutboundFrame, SessionHandle};
pub use pool::SessionPool;
pub use state::SessionState;
