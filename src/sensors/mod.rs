//! Sensor-side data model: identities, descriptors, bindings and the per
//! record-kind conversion functions.

pub mod bindings;
pub mod cache;
pub mod conversion;
pub mod link;
pub mod models;
pub mod records;
pub mod states;
pub mod units;

pub use bindings::{PointBindings, PointEntry, PointId, ProcessingMode};
pub use cache::DescriptorCache;
pub use link::{LinkError, PointLink};
pub use models::{RecordType, SdrKind, SensorDescriptor, SensorId, SensorRange, SlaveAddr};
pub use records::{PointMetadata, ReadingValue};
