pub mod src {
    pub mod error_code;
    pub mod util;
}

pub use src::error_code::*;
pub use src::util::*;
