pub mod export;
pub mod ipc;
pub mod report;
pub mod session;
pub mod transport;
pub mod watcher;

pub use export::*;
pub use ipc::*;
pub use report::*;
pub use session::*;
pub use transport::*;
pub use watcher::*;
