pub mod composite;
pub mod gauge;
pub mod sunburst;
pub mod surface;
pub mod text;
