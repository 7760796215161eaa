// Wire models: handles, typed values, snapshots, usage

mod handle;
mod snapshot;
mod usage;
mod value;

pub use handle::{ResourceHandle, ResourceKind};
pub use snapshot::{Snapshot, SnapshotQuery, SortDirection};
pub use usage::{IoUsage, MemoryUsage, SystemInfoRecord, SystemLimits, UsageRecord};
pub use value::{Attributes, NormalizedRecord, Value};
