//! Backend descriptors and the common request/reply envelope.

pub mod descriptor;
pub mod reply;

pub use descriptor::{BackendCapabilities, BackendDescriptor, BackendKind};
pub use reply::{ChatParameters, RawReply, Usage, flatten_content};
