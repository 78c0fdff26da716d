//! Wallet session and the page workflows built on it, free of any browser API.

pub mod gallery;
pub mod listing;
pub mod manager;
pub mod session;

pub use gallery::{CardAction, GalleryView};
pub use listing::{ListingOutcome, ListingPhase};
pub use manager::ManagerDashboard;
pub use session::{CallHandle, Session, SessionEvent, connect_alert};
