pub mod clock;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod factory;
pub mod guard;
pub mod headers;
pub mod identity;
pub mod model;
pub mod report;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{CheckOutcome, CheckService};
pub use factory::build_check_service;
pub use error::{CheckError, TokenError, ValidationFailure};
pub use headers::Headers;
pub use model::{Claims, Decision, Request};
