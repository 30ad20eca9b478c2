pub mod cas;
pub mod health;
