use onbeat_ports::storage::SessionSettingsDto;
use onbeat_ports::transport::TransportSnapshot;
use onbeat_ports::types::{Bpm, TempoError, TimeSignature};

/// Manual tempo wins when enabled or when the host does not report one.
pub fn resolve_tempo(
    snapshot: &TransportSnapshot,
    settings: &SessionSettingsDto,
) -> Result<Bpm, TempoError> {
    match snapshot.bpm {
        Some(host_bpm) if !settings.use_manual_bpm => Bpm::new(host_bpm),
        _ => Bpm::new(settings.manual_bpm),
    }
}

pub fn resolve_time_signature(snapshot: &TransportSnapshot) -> TimeSignature {
    snapshot.time_signature.unwrap_or_default()
}
