mod cause;
mod gx;
mod ies;
mod s11;
mod s8;
mod sgi;
mod tunnel;

pub use cause::Cause;
pub use gx::*;
pub use ies::*;
pub use s11::*;
pub use s8::*;
pub use sgi::*;
pub use tunnel::*;
