pub mod driver;
pub mod viewport;
