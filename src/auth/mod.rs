pub mod authentication;
pub mod credentials;
pub mod session;

pub use authentication::*;
pub use credentials::*;
pub use session::*;
