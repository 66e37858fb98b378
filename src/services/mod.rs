pub mod recommendation;
pub mod server;
pub mod training;
