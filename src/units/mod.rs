//! Units and the catalog they are bought from

pub mod catalog;
pub mod unit;

pub use catalog::{SupportUpgrade, UnitTemplate};
pub use unit::{MovementMode, Unit, UnitKind, UnitRecord, UnitSize, UnitStats};
