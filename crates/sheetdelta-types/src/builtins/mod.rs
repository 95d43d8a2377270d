pub mod boolean;
pub mod date;
pub mod dropdown;
pub mod number;
pub mod phone;
pub mod text;
pub mod time;
pub mod utils;

pub use boolean::BooleanType;
pub use date::DateType;
pub use dropdown::DropdownType;
pub use number::{NumberFormat, NumberType};
pub use phone::PhoneType;
pub use text::TextType;
pub use time::TimeType;

use crate::ColumnType;
use std::sync::{Arc, Once};

/// Fresh instances of every builtin strategy, in `DataKind` order.
pub fn all() -> Vec<Arc<dyn ColumnType>> {
    vec![
        Arc::new(TextType),
        Arc::new(NumberType),
        Arc::new(DateType),
        Arc::new(TimeType),
        Arc::new(DropdownType),
        Arc::new(PhoneType),
        Arc::new(BooleanType),
    ]
}

pub fn register_builtins() {
    for ty in all() {
        crate::registry::register(ty);
    }
}

static BUILTINS: Once = Once::new();

/// Register the builtins exactly once per process. Custom registrations made
/// afterwards replace them.
pub fn ensure_builtins_loaded() {
    BUILTINS.call_once(register_builtins);
}
