pub mod events;
pub mod protocol;
pub mod server;

pub use events::{AttendanceEvent, EventHub};
pub use server::{bind, create_router, serve, AppState, SharedState};
