pub mod api;
pub mod sessions;
pub mod sync;
pub mod utils;
