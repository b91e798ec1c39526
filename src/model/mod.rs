pub mod quote;
pub mod signal;
