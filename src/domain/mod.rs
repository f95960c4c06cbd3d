pub mod board;
pub mod grid;
pub mod moves;
pub mod rules;
pub mod vehicle;
