use crate::types::RequestId;

/// Telemetry messages handled by device entities
#[derive(Debug)]
pub enum DeviceMsg {
    RecordTemperature { request_id: RequestId, value: f64 },
    ReadTemperature { request_id: RequestId },
}

/// Listing queries handled by group registries
#[derive(Debug)]
pub enum GroupMsg {
    RequestDeviceList { request_id: RequestId },
}

/// Device registry messages
#[derive(Debug)]
pub enum RegistryMsg {
    GetStatus,
}

/// Supervisor messages
#[derive(Debug)]
pub enum SupervisorMsg {
    GetStatus,
    GetRegistry,
    Shutdown,
}
