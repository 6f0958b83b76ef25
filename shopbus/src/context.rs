//! Typed provider lookup
//!
//! Components that are handed an [`AppContext`] pull the services they need
//! out of it by type instead of receiving each one as an argument. Providers
//! are registered once through [`ContextBuilder`]; registering the same type
//! twice keeps the later value.
//!
//! ```
//! use shopbus::context::{AppContext, ContextError};
//!
//! #[derive(Debug)]
//! struct Currency(&'static str);
//!
//! let ctx = AppContext::builder().provide(Currency("EUR")).build();
//! assert_eq!(ctx.get::<Currency>().unwrap().0, "EUR");
//! assert!(matches!(ctx.get::<u32>(), Err(ContextError::MissingProvider { .. })));
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::cart::CartStore;
use crate::facades::{Analytics, CartEvents, Notify, UiEvents};
use crate::notifications::NotificationCenter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Lookup of a type nothing was registered for
    #[error("no provider for `{type_name}` in this context")]
    MissingProvider { type_name: &'static str },
}

struct Provider {
    value: Rc<dyn Any>,
    type_name: &'static str,
}

/// Immutable set of providers keyed by type
///
/// Cloning is cheap; clones share the same providers.
#[derive(Clone, Default)]
pub struct AppContext {
    providers: Rc<HashMap<TypeId, Provider>>,
}

impl AppContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// The provider registered for `T`
    pub fn get<T: 'static>(&self) -> Result<Rc<T>, ContextError> {
        self.try_get().ok_or(ContextError::MissingProvider {
            type_name: type_name::<T>(),
        })
    }

    /// Like [`get`](Self::get), without the error
    pub fn try_get<T: 'static>(&self) -> Option<Rc<T>> {
        let provider = self.providers.get(&TypeId::of::<T>())?;
        Rc::clone(&provider.value).downcast::<T>().ok()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn require_cart(&self) -> Result<Rc<CartStore>, ContextError> {
        self.get()
    }

    pub fn require_notify(&self) -> Result<Rc<Notify>, ContextError> {
        self.get()
    }

    pub fn require_analytics(&self) -> Result<Rc<Analytics>, ContextError> {
        self.get()
    }

    pub fn require_cart_events(&self) -> Result<Rc<CartEvents>, ContextError> {
        self.get()
    }

    pub fn require_ui(&self) -> Result<Rc<UiEvents>, ContextError> {
        self.get()
    }

    pub fn require_notifications(&self) -> Result<Rc<NotificationCenter>, ContextError> {
        self.get()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.providers.values().map(|p| p.type_name).collect();
        names.sort_unstable();
        f.debug_struct("AppContext")
            .field("providers", &names)
            .finish()
    }
}

/// Collects providers for an [`AppContext`]
#[derive(Default)]
pub struct ContextBuilder {
    providers: HashMap<TypeId, Provider>,
}

impl ContextBuilder {
    pub fn provide<T: 'static>(mut self, value: T) -> Self {
        self.providers.insert(
            TypeId::of::<T>(),
            Provider {
                value: Rc::new(value),
                type_name: type_name::<T>(),
            },
        );
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            providers: Rc::new(self.providers),
        }
    }
}
