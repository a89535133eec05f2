//! Ordered first-match dispatch over join handlers.
//!
//! Handlers are consulted in registration order; the first one whose
//! [`supports`](super::EntityJoinHandler::supports) returns `true` decides the
//! field and no later handler is asked. When no handler applies the result is
//! [`Resolution::NoResolverMatched`], which is an ordinary outcome and not an
//! error.
//!
//! ## Example
//!
//! ```
//! use searchy_db::fields::{Annotation, FieldDescriptor};
//! use searchy_db::join::{
//!     DefaultJoinHandler, ElementCollectionJoinHandler, JoinDecision, JoinHandlerChain,
//! };
//!
//! let chain = JoinHandlerChain::new()
//!     .with_handler(ElementCollectionJoinHandler)
//!     .with_handler(DefaultJoinHandler);
//!
//! let field = FieldDescriptor::new("Person", "Set<String>", "nickNames")
//!     .annotated(Annotation::element_collection());
//! assert_eq!(chain.resolve(&field).unwrap().decision(), Some(JoinDecision::LEFT_FETCH));
//! ```

use std::fmt;
use std::sync::Arc;

use searchy_core::SearchyResult;

use super::{EntityJoinHandler, JoinDecision};
use crate::fields::FieldDescriptor;

/// The result of running a field through a [`JoinHandlerChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A handler supported the field.
    Matched {
        /// The position of the deciding handler in the chain.
        handler: usize,
        /// The decision it returned.
        decision: JoinDecision,
    },
    /// No handler in the chain supported the field.
    NoResolverMatched,
}

impl Resolution {
    /// Returns the decision, if a handler matched.
    pub const fn decision(&self) -> Option<JoinDecision> {
        match self {
            Self::Matched { decision, .. } => Some(*decision),
            Self::NoResolverMatched => None,
        }
    }

    /// Returns the index of the deciding handler, if a handler matched.
    pub const fn handler_index(&self) -> Option<usize> {
        match self {
            Self::Matched { handler, .. } => Some(*handler),
            Self::NoResolverMatched => None,
        }
    }

    /// Returns `true` if a handler matched.
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { decision, .. } => write!(f, "{decision}"),
            Self::NoResolverMatched => f.write_str("no resolver matched"),
        }
    }
}

/// An ordered list of join handlers evaluated first-match.
#[derive(Clone, Default)]
pub struct JoinHandlerChain {
    handlers: Vec<Arc<dyn EntityJoinHandler>>,
}

impl fmt::Debug for JoinHandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.name()))
            .finish()
    }
}

impl JoinHandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a shared handler. Handlers are evaluated in insertion order.
    pub fn push(&mut self, handler: Arc<dyn EntityJoinHandler>) {
        self.handlers.push(handler);
    }

    /// Appends a handler, builder style.
    #[must_use]
    pub fn with_handler(mut self, handler: impl EntityJoinHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Returns the number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether the chain has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the handlers in evaluation order.
    pub fn handlers(&self) -> &[Arc<dyn EntityJoinHandler>] {
        &self.handlers
    }

    /// Returns the position and handler that would decide the field.
    pub fn select(&self, field: &FieldDescriptor) -> Option<(usize, &dyn EntityJoinHandler)> {
        self.handlers
            .iter()
            .enumerate()
            .find(|(_, handler)| handler.supports(field))
            .map(|(index, handler)| (index, handler.as_ref()))
    }

    /// Classifies a field with the first handler that supports it.
    ///
    /// # Errors
    ///
    /// Propagates the error of the deciding handler's `handle` call.
    pub fn resolve(&self, field: &FieldDescriptor) -> SearchyResult<Resolution> {
        let Some((index, handler)) = self.select(field) else {
            tracing::debug!(
                entity = %field.entity_type,
                field = %field.field_name,
                "No join handler matched"
            );
            return Ok(Resolution::NoResolverMatched);
        };

        let decision = handler.handle(field)?;
        tracing::debug!(
            entity = %field.entity_type,
            field = %field.field_name,
            handler = handler.name(),
            %decision,
            "Join handler matched"
        );
        Ok(Resolution::Matched {
            handler: index,
            decision,
        })
    }
}
