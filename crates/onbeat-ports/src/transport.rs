use crate::types::TimeSignature;
use serde::{Deserialize, Serialize};

/// What the host reports about its transport. Every field is optional on the host side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportSnapshot {
    pub bpm: Option<f64>,
    pub time_signature: Option<TimeSignature>,
    pub is_recording: bool,
}

pub trait HostTransportPort: Send + Sync {
    fn snapshot(&self) -> TransportSnapshot;
}

/// Host that reports nothing; tempo falls back to the manual value.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedTransport;

impl HostTransportPort for DetachedTransport {
    fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot::default()
    }
}
