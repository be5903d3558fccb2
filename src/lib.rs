pub mod backup;
pub mod container;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod map;
pub mod model;
pub mod patch;
pub mod rearrange;

pub use container::{read_banks, write_banks};
pub use error::{FormatError, ReferenceError, UsageError};
pub use map::{read_map, write_map, MapBank, MapSlot};
pub use model::{Bank, Registration};
pub use patch::patch_banks;
pub use rearrange::rearrange_banks;
