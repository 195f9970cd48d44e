pub mod health;
pub mod parking;
pub mod upload;
