//! Domain reports aggregated from several classification passes.

pub mod facial;
pub mod food;
pub mod heuristics;

pub use facial::{assess_facial_features, FacialReport, SeverityAssessment};
pub use food::{analyze_food, FoodReport};
pub use heuristics::{GlycemicLevel, PcosStatus, ProteinLevel};
