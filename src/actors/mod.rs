pub mod children;
pub mod device;
pub mod group;
pub mod registry;
pub mod supervisor;

// Re-exports
pub use device::{DeviceEntity, DeviceReply};
pub use group::{GroupRegistry, GroupReply};
pub use registry::{DeviceRegistered, DeviceRegistry, RegistryReply, RequestTrack, track};
pub use supervisor::{Supervisor, SupervisorReply};
