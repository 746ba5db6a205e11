pub mod analysis;
pub mod graphics;
pub mod project;
