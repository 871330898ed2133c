pub mod source;
pub mod storage;
pub mod transport;
pub mod types;

pub use source::*;
pub use storage::*;
pub use transport::*;
pub use types::*;
