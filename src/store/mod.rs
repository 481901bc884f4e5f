pub mod inventory;

pub mod state;
