//! Trained classifier models.

pub mod forest;

pub use forest::ForestModel;
