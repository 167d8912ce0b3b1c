pub mod conflict;
pub mod expiry;
pub mod permissions;
pub mod state;

pub use state::RequestAction;
