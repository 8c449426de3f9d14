//! Addresses, endpoints and the raw socket primitives under the server.

pub mod address;
pub mod socket;

pub use address::{Address, AddressFamily, Endpoint, Port};
pub use socket::Descriptor;
