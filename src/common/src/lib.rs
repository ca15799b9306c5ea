pub mod constants;
pub mod diagnostics;
pub mod identity;
pub mod types;
