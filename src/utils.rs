use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Resolve a link target the way a browser resolves an anchor's `href`
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match base.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            ::log::debug!("Cannot resolve link {:?} against {}: {}", href, base, e);
            None
        }
    }
}

/// Lock a mutex that only guards plain bookkeeping, ignoring poisoning
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
