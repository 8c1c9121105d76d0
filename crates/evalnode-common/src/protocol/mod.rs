pub mod error;
pub mod requests;
pub mod responses;


pub use error::{EvalnodeError, Result};
pub use requests::InvocationRequest;
pub use responses::{ErrorBody, InvocationResponse};
