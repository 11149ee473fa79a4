pub mod navbar;
pub mod pagination;
