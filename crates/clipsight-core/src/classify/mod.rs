//! Zero-shot classification against fixed label taxonomies.
//!
//! Scores an image embedding against the text embeddings of a taxonomy's
//! labels with a temperature-scaled softmax, then ranks the labels.

pub mod classifier;
pub mod label_bank;
pub mod scorer;
pub mod taxonomy;

pub use classifier::AspectClassifier;
pub use label_bank::{LabelBank, LabelBankCache};
pub use taxonomy::{Label, Taxonomy, TaxonomyId, TaxonomyRegistry};
