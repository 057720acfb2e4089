pub mod flags;

pub use self::flags::{ContentFlags, SurfaceFlags};
