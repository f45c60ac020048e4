mod primitives;
mod report;

pub use primitives::*;
pub use report::*;
