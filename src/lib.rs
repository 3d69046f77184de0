pub mod batch;
pub mod cli;
pub mod error;
pub mod location;
pub mod pdf;
pub mod resolve;
pub mod stamp_image;
pub mod stamper;

pub use error::StampError;
pub use location::StampLocation;
pub use stamp_image::{Quality, StampImage};
