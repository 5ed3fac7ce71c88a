//! Ordered factory chains: first match wins, `skip_past` delegates onward.

use std::sync::Arc;

use crate::error::JianjiaError;

/// Outcome of asking one factory for a converter or adapter.
pub enum Lookup<T> {
    /// The factory handles this type.
    Found(T),
    /// Not this factory's type; the chain moves on.
    Declined,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Declined => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// Index of the first factory to consult.
///
/// Factories are matched by address, so a factory passes itself to delegate
/// to whatever was registered after it. An unknown `skip_past` starts at 0.
pub(crate) fn start_after<F: ?Sized>(factories: &[Arc<F>], skip_past: Option<&F>) -> usize {
    let Some(skip) = skip_past else {
        return 0;
    };
    factories
        .iter()
        .position(|f| std::ptr::addr_eq(Arc::as_ptr(f), skip as *const F))
        .map_or(0, |i| i + 1)
}

/// Diagnostic listing skipped and tried factories in registration order.
pub(crate) fn not_located(
    what: &str,
    type_name: &str,
    names: &[&str],
    start: usize,
    skipped: bool,
) -> JianjiaError {
    let mut msg = format!("Could not locate {} for {}.\n", what, type_name);
    if skipped {
        msg.push_str("  Skipped:");
        for name in &names[..start] {
            msg.push_str("\n   * ");
            msg.push_str(name);
        }
        msg.push('\n');
    }
    msg.push_str("  Tried:");
    for name in &names[start..] {
        msg.push_str("\n   * ");
        msg.push_str(name);
    }
    JianjiaError::Resolution(msg)
}
