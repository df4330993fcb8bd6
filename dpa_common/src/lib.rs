mod ids;
mod secret;

pub mod helpers;

pub use ids::{OrderId, VendorId};
pub use secret::Secret;
