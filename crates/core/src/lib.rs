#![forbid(unsafe_code)]

pub mod model;
pub mod time;

pub use time::Clock;
pub use url::Url;
