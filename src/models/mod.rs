pub mod detection;
pub mod parked_car;

pub use detection::{DetectedCar, DetectionRequest, DetectionResponse, UploadCar};
pub use parked_car::{check_width, normalize_plate, NewParkedCar, ParkRequest, ParkedCar};
