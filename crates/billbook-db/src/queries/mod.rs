pub mod bills;
pub mod markers;
pub mod templates;
