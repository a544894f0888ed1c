pub mod game;
pub mod health;
pub mod save;
pub mod server;
pub mod user;
pub mod validation;
