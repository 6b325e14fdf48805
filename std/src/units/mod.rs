pub mod debug;
pub mod flow;
pub mod logic;
