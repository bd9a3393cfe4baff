//! The slot holding the optional message rewrite applied before reporting.

use alloc::sync::Arc;
use core::fmt;

use spin::RwLock;

/// A pure function rewriting a record's message right before it is reported.
pub type MessageTransform = dyn Fn(&str) -> String + Send + Sync + 'static;

/// Holds at most one installed [`MessageTransform`]. The latest installation
/// wins.
#[derive(Default)]
pub struct TransformSlot(RwLock<Option<Arc<MessageTransform>>>);

impl TransformSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self(RwLock::new(None))
    }

    /// Installs `transform`, replacing any previous one.
    pub fn set<F>(&self, transform: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        *self.0.write() = Some(Arc::new(transform));
    }

    /// Clears the slot.
    pub fn remove(&self) {
        *self.0.write() = None;
    }

    /// Returns `true` if a transform is installed.
    pub fn is_set(&self) -> bool {
        self.0.read().is_some()
    }

    /// Applies the installed transform to `message`, or returns `None` if the
    /// slot is empty.
    ///
    /// The transform runs after the lock has been released, so it may itself
    /// install or remove transforms.
    pub fn apply(&self, message: &str) -> Option<String> {
        let transform = self.0.read().clone()?;
        Some(transform(message))
    }
}

impl fmt::Debug for TransformSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_installation_wins() {
        let slot = TransformSlot::new();
        assert_eq!(slot.apply("quiet"), None);

        slot.set(|m| m.to_uppercase());
        slot.set(|m| format!("[svc] {m}"));
        assert_eq!(slot.apply("quiet").as_deref(), Some("[svc] quiet"));

        slot.remove();
        assert!(!slot.is_set());
        assert_eq!(slot.apply("quiet"), None);
    }
}
