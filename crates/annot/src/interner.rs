//! Process-wide sealed string interner.
//!
//! Dictionary loading interns every token and CUI so that multi-token term
//! matching can compare by pointer instead of by content. Once all
//! dictionaries are loaded the store is sealed: lookups still return the
//! canonical pointer when the string was seen before sealing, but unseen
//! strings come back as fresh allocations that are *not* retained, keeping
//! the store bounded for the life of the process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use fxhash::FxHashMap;

/// Interned (or interner-shaped) string handle. Cheap to clone; pointer
/// identity is meaningful only for handles obtained through [`intern`]
/// before the store was sealed.
pub type IStr = Arc<str>;

struct Store {
    map: RwLock<FxHashMap<String, IStr>>,
    sealed: AtomicBool,
}

static STORE: std::sync::OnceLock<Store> = std::sync::OnceLock::new();

fn store() -> &'static Store {
    STORE.get_or_init(|| Store {
        map: RwLock::new(FxHashMap::default()),
        sealed: AtomicBool::new(false),
    })
}

/// Intern `s` (lowercased) and return the canonical handle.
///
/// After [`seal_interner`] has been called, strings already present keep
/// returning their canonical handle; new strings are returned as fresh
/// unreferenced handles.
pub fn intern(s: &str) -> IStr {
    let lower = s.to_lowercase();
    let st = store();

    if let Some(found) = st
        .map
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&lower)
    {
        return Arc::clone(found);
    }

    if st.sealed.load(Ordering::Acquire) {
        return Arc::from(lower.as_str());
    }

    let mut map = st
        .map
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(found) = map.get(&lower) {
        return Arc::clone(found);
    }
    let handle: IStr = Arc::from(lower.as_str());
    map.insert(lower, Arc::clone(&handle));
    handle
}

/// Build an [`IStr`] without touching the store. Used for transient text
/// (sentence slices, FSM output spans) that must never be retained.
pub fn istr(s: &str) -> IStr {
    Arc::from(s)
}

/// Seal the store. Idempotent; called once after all dictionaries loaded.
pub fn seal_interner() {
    store().sealed.store(true, Ordering::Release);
}

/// Whether the store has been sealed.
pub fn interner_sealed() -> bool {
    store().sealed.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests share the process-wide store, so sealing happens exactly once
    // here and every assertion works on both sides of the seal.
    #[test]
    fn interner_canonicalizes_then_seals() {
        let a = intern("Aspirin-Test");
        let b = intern("aspirin-test");
        assert_eq!(&*a, "aspirin-test");
        assert!(Arc::ptr_eq(&a, &b));

        let before = intern("sealed-canary");
        seal_interner();
        assert!(interner_sealed());
        let after = intern("SEALED-CANARY");
        assert!(Arc::ptr_eq(&before, &after));

        // Unseen strings are equal by content but not retained.
        let fresh_a = intern("post-seal-only");
        let fresh_b = intern("post-seal-only");
        assert_eq!(fresh_a, fresh_b);
        assert!(!Arc::ptr_eq(&fresh_a, &fresh_b));
    }
}
