pub mod types;

mod request;
mod run_api;

pub use request::*;
pub use run_api::*;
