//! Data models

pub mod report;
pub mod correction;
pub mod rule;

pub use report::*;
pub use correction::*;
pub use rule::*;
