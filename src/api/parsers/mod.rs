pub mod request;

pub use request::{parse_integer, round_rating};
