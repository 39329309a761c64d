//! Query stages applied to a loaded snapshot: date filter, spatial aggregate and heat
//! weight normalization.

pub mod aggregate;
pub mod filtering;
pub mod normalize;

pub use aggregate::{aggregate, RegionCount, RegionCounts};
pub use filtering::{date_predicate, ObservationFrame};
pub use normalize::BrightnessBounds;
