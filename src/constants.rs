/// Prefix attached to every log line emitted by this service.
pub const API_NAME: &str = "[smart-parking-api]";

/// Column widths of `parked_cars`, in characters, checked on the normalized
/// value before any statement runs.
pub const MAX_PLATE_LEN: usize = 20;
pub const MAX_SPOT_LEN: usize = 10;
