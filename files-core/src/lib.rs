pub mod connection;
pub mod facades;
pub mod ports;

pub use connection::{ConnectionState, ConnectionStatus};
pub use facades::{DocumentStoreFacade, KeyValueStoreFacade};
