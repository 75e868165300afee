pub mod adapt;
pub mod connection;
pub mod convert;
pub mod cursor;
pub mod params;
pub mod response;
pub mod transport;
pub mod types;
