/// State management module
///
/// This module handles all session state:
/// - Image assets and their cropped results (data.rs)
/// - Pending/processed lists, slot cursor, commit and navigation (session.rs)
/// - Double-click reorder mode for the pending strip (reorder.rs)

pub mod data;
pub mod reorder;
pub mod session;

pub use session::{LoadRequest, Session, SessionPhase};
