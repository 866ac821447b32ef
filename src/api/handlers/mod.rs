//! REST API handlers organized by domain.

pub mod campaigns;
pub mod creators;
pub mod proposals;
pub mod webhooks;

pub use campaigns::*;
pub use creators::*;
pub use proposals::*;
pub use webhooks::*;
