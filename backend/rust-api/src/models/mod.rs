pub mod drill;
pub mod feedback;
pub mod migration;
pub mod progress;
