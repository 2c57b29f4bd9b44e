pub mod client_builder;
pub mod sanitize_error;
