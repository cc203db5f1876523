//! GPUI elements.
//!
//! [`ConfinementBoundary`] wraps the confined part of a window. It renders
//! its children unchanged and, on every render, asks the global
//! confinement to put the visible location back inside the pattern if it
//! escaped.

use crate::context::reconcile_global;
use crate::history::Correction;
use crate::trace_log;
use gpui::*;

/// Wrapper that runs the confinement safety net on render.
///
/// # Example
///
/// ```ignore
/// impl Render for FlowView {
///     fn render(&mut self, _window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
///         ConfinementBoundary::new()
///             .child(self.step.clone())
///             .build(cx)
///     }
/// }
/// ```
#[derive(Default)]
pub struct ConfinementBoundary {
    children: Vec<AnyElement>,
}

impl ConfinementBoundary {
    /// Create an empty boundary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child element
    pub fn child(mut self, child: impl IntoElement) -> Self {
        self.children.push(child.into_any_element());
        self
    }

    /// Reconcile, then render the children.
    ///
    /// A single child is returned as is, adding no layout node. Several
    /// children share a full-size container, the same shape the router
    /// outlet gives its content.
    pub fn build<V: 'static>(mut self, cx: &mut Context<'_, V>) -> AnyElement {
        let correction = reconcile_global(cx);
        if !correction.is_accept() {
            trace_log!("ConfinementBoundary applied {:?}; refreshing", correction);
            cx.notify();
        }
        if self.children.len() == 1 {
            if let Some(child) = self.children.pop() {
                return child;
            }
        }
        div().size_full().children(self.children).into_any_element()
    }
}

/// Functional form of [`ConfinementBoundary`] for a single child.
pub fn confinement_boundary<V: 'static>(
    child: impl IntoElement,
    cx: &mut Context<'_, V>,
) -> impl IntoElement {
    ConfinementBoundary::new().child(child).build(cx)
}

impl std::fmt::Debug for ConfinementBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfinementBoundary")
            .field("children", &self.children.len())
            .finish()
    }
}
