pub mod controller;
pub mod import;
pub mod model;
pub mod router;
pub mod service;
