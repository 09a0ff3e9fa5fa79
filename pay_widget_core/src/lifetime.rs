// Component lifetime token checked after every suspended SDK call

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that flips to cancelled once the widget is torn down.
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    cancelled: Rc<Cell<bool>>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_alive(&self) -> bool {
        !self.cancelled.get()
    }
}
