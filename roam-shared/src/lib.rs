pub mod models;
pub mod money;
pub mod pii;

pub use models::booking::{Booking, BookingStatus};
pub use models::package::TravelPackage;
pub use pii::Sensitive;
