//! Public request handler module
//!
//! Serves the promotion page for the active slug and the stored documents.

pub mod media;
pub mod pages;
pub mod promotion;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
