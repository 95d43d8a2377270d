pub mod cell;
pub mod column;
pub mod error;
pub mod format;
pub mod schema;
pub mod value;

pub use cell::*;
pub use column::*;
pub use error::*;
pub use format::*;
pub use schema::*;
pub use value::*;
