//! API layer - HTTP endpoints and middleware

pub mod carts;
pub mod health;
pub mod members;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::RequireMember;
pub use router::{create_router, create_router_with_state};
pub use state::AppState;
