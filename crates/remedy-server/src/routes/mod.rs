pub mod actions;
pub mod health;
