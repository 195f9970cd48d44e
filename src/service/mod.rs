pub mod detection_relay;
pub mod parking;


pub use detection_relay::{DetectionRelay, HttpPlateDetector, PlateDetector};
pub use parking::ParkingService;
