pub mod dto;
mod health;
mod router;

pub use health::{DbHealth, SERVICE_NAME, check_database};
pub use router::{AppState, create_router};
