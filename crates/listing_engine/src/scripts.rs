//! Scripts the pipeline hands to [`crate::Surface::run_script`].

pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

pub const DOCUMENT_HEIGHT: &str = "return document.body.scrollHeight;";

/// Expects the target element as `arguments[0]`.
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";

/// Expects the target element as `arguments[0]`.
pub const FORCE_CLICK: &str = "arguments[0].click();";

pub const NOOP: &str = "void(0);";
