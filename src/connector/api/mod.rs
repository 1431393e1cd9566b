pub mod container;
pub mod controller;
pub mod router;

pub use container::{normalize_host, Container, ContainerConfig};
pub use router::Router;
