//! Convenient re-exports for common usage.
//!
//! ```
//! use lww_dict::prelude::*;
//! ```

pub use crate::clock::{ManualClock, SystemClock, TimeSource};
pub use crate::ConcurrentMap;
pub use crate::Crdt;
pub use crate::DeltaCrdt;
pub use crate::LwwDictionary;
pub use crate::ReplicaState;
pub use crate::Timestamped;
