pub mod calendar;
pub mod conversation;

pub use calendar::*;
pub use conversation::*;
