pub mod arena;
pub mod core;
pub mod resource;
pub mod util;
