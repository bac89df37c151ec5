//! Outlabel layout: geometry, label model, collision resolution and the
//! fit loop, plus the built-in pie host.

pub mod fit;
pub mod geometry;
pub mod label;
pub mod pie;
pub mod positioner;
pub mod resolver;
pub mod template;
pub(crate) mod types;

pub use fit::{FitOutcome, FitReport};
pub use geometry::{BoundingBox, Point, Rect, Size};
pub use label::{Connector, LabelGeometry, LabelSkip, LabelStyle, OutLabel};
pub use resolver::{Placement, MAX_PLACEMENT_ATTEMPTS};
pub use types::*;
