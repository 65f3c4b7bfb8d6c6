pub mod connection;

pub use connection::{Connection, ConnectionSender, Endpoint};
