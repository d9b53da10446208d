pub mod errors;
pub mod shutdown;
pub mod validations;

pub use errors::*;
pub use shutdown::*;
