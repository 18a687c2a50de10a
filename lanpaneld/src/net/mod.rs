pub mod probe;
pub mod wol;
