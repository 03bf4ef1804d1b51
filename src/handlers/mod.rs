pub mod alerts;
pub mod health;
pub mod hub;
pub mod inventory;
