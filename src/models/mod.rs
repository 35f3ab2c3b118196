pub mod assessment;
pub mod casebook;
pub mod contact;
pub mod enums;
pub mod file;
pub mod id;
pub mod note;
pub mod patient;
pub mod task;

pub use assessment::*;
pub use casebook::*;
pub use contact::*;
pub use enums::*;
pub use file::*;
pub use id::*;
pub use note::*;
pub use patient::*;
pub use task::*;
