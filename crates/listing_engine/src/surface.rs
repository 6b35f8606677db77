use serde_json::Value;
use thiserror::Error;

use crate::SourceError;

/// Opaque reference to an element in some browsing context's document.
///
/// Handles go stale once their document is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Opaque reference to a browsing context (a tab or window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(pub u64);

/// Where an element query starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The focused context's whole document.
    Document,
    /// Descendants of one element.
    Element(ElementHandle),
}

/// Argument passed to a script, exposed to it as `arguments[i]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Element(ElementHandle),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("stale element handle {0:?}")]
    StaleElement(ElementHandle),
    #[error("element {0:?} is not interactable")]
    NotInteractable(ElementHandle),
    #[error("script failed: {0}")]
    Script(String),
    #[error("unknown browsing context {0:?}")]
    NoSuchContext(ContextHandle),
    #[error("no document loaded in the focused context")]
    NoDocument,
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The browser automation capability the pipeline runs on.
///
/// Every call blocks until the browser answered. All queries and actions
/// apply to the focused context; only [`Surface::open_context`],
/// [`Surface::close_context`] and [`Surface::focus`] manage contexts.
pub trait Surface {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError>;

    /// Elements matching `selector` under `scope`, in document order.
    fn find_all(&mut self, scope: Scope, selector: &str)
        -> Result<Vec<ElementHandle>, SurfaceError>;

    fn find_one(
        &mut self,
        scope: Scope,
        selector: &str,
    ) -> Result<Option<ElementHandle>, SurfaceError> {
        Ok(self.find_all(scope, selector)?.into_iter().next())
    }

    /// Rendered text of the element.
    fn text(&self, element: ElementHandle) -> Result<String, SurfaceError>;

    fn attribute(&self, element: ElementHandle, name: &str)
        -> Result<Option<String>, SurfaceError>;

    fn is_displayed(&self, element: ElementHandle) -> Result<bool, SurfaceError>;

    fn click(&mut self, element: ElementHandle) -> Result<(), SurfaceError>;

    fn run_script(&mut self, script: &str, args: &[ScriptArg]) -> Result<Value, SurfaceError>;

    /// Opens `url` in a new context without focusing it.
    fn open_context(&mut self, url: &str) -> Result<ContextHandle, SurfaceError>;

    fn close_context(&mut self, context: ContextHandle) -> Result<(), SurfaceError>;

    fn focus(&mut self, context: ContextHandle) -> Result<(), SurfaceError>;

    fn current_context(&self) -> ContextHandle;

    fn current_url(&self) -> Result<String, SurfaceError>;
}
