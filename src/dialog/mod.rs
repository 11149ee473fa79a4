pub mod chrome;
pub mod presenter;
