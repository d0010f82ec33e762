//! Line-oriented front end for the editor pipeline.

pub mod session;

pub use session::Session;
