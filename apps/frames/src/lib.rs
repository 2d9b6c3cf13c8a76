pub mod batch;
pub mod errors;
pub mod fonts;
pub mod frame;
pub mod layout;
