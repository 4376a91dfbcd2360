//! Database models and queries

pub mod history;
pub mod init;
pub mod settings;
pub mod tracks;

pub use history::*;
pub use init::*;
pub use settings::*;
pub use tracks::*;
