pub mod midi_import;
pub mod model;
pub mod note_names;
pub mod reference;
pub mod time_base;

pub use midi_import::*;
pub use model::*;
pub use note_names::*;
pub use reference::*;
pub use time_base::*;
