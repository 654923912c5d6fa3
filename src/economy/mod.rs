//! Points and key-point income

pub mod keypoints;
pub mod ledger;

pub use keypoints::{KeyPoint, KeyPointKind, KeyPoints};
pub use ledger::{Ledger, PointLedger, Points};
