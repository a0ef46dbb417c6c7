pub mod conversion;
pub mod step;

pub use conversion::*;
pub use step::*;
