pub mod postgres;

pub use postgres::{close_pool, connect, create_pool, verify_connection};
