pub mod alignment;
pub mod onset;
pub mod summary;

pub use alignment::*;
pub use onset::*;
pub use summary::*;
