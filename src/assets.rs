pub mod decode;
pub mod portrait;
