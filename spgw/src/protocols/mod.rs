pub mod pco;
pub mod s11;
