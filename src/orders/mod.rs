//! Strategic orders, the channel that carries them, and the rules for
//! replacing them

pub mod mailbox;
pub mod order;
pub mod stability;

pub use mailbox::{channel_key, OrderChannel};
pub use order::{MissionType, OrderStatus, Priority, StrategicOrder};
pub use stability::{is_emergency, should_issue_new_order, StabilityCheck, StabilityReason};
