//! URL feature extraction for the classifier.

pub mod extractor;
pub mod host;
pub mod lexical;

pub use extractor::UrlFeatureExtractor;
pub use host::{HostProber, TopSites};
