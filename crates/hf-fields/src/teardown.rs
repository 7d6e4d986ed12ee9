//! Teardown Registry
//!
//! Cleanup actions collected during construction and run once, in
//! registration order.

use crate::HostedFieldsError;

pub type TeardownAction = Box<dyn FnOnce() -> Result<(), HostedFieldsError>>;

#[derive(Default)]
pub struct TeardownRegistry {
    actions: Vec<(&'static str, TeardownAction)>,
}

impl TeardownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        action: impl FnOnce() -> Result<(), HostedFieldsError> + 'static,
    ) {
        self.actions.push((name, Box::new(action)));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every action. A failing action does not stop the rest; the
    /// first failure is returned.
    pub fn teardown(&mut self) -> Result<(), HostedFieldsError> {
        let mut first_error = None;
        for (name, action) in self.actions.drain(..) {
            if let Err(e) = action() {
                tracing::warn!("Teardown step {} failed: {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for TeardownRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_runs_all_and_reports_first_error() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let mut registry = TeardownRegistry::new();

        for (name, fail) in [("a", false), ("b", true), ("c", true), ("d", false)] {
            let ran = ran.clone();
            registry.register(name, move || {
                ran.borrow_mut().push(name);
                if fail {
                    Err(HostedFieldsError::MalformedResponse(name.into()))
                } else {
                    Ok(())
                }
            });
        }
        assert_eq!(registry.len(), 4);

        let err = registry.teardown().unwrap_err();
        assert!(matches!(err, HostedFieldsError::MalformedResponse(ref n) if n == "b"));
        assert_eq!(*ran.borrow(), vec!["a", "b", "c", "d"]);
        assert!(registry.is_empty());
        assert!(registry.teardown().is_ok());
    }
}
