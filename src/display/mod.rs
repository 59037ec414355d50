mod player;
pub mod terminal;

pub use player::{Flow, Player};
