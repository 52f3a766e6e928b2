//! Linux specific devices.

mod sys;
pub mod tap;

pub use self::tap::Tap;
