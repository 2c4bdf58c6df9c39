//! Reactive Context
//!
//! The reactive context tracks which effect is currently running, so reads
//! can be attributed to it.
//!
//! # Implementation
//!
//! We use a thread-local stack of frames. Running an effect pushes a frame
//! holding its subscriber and the returned guard pops it, so a nested run
//! restores the outer effect when it finishes. An empty frame (pushed by
//! [`untracked`]) hides the enclosing effect.

use std::cell::RefCell;

use super::subscriber::{Subscriber, SubscriberId};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Option<Subscriber>>> = RefCell::new(Vec::new());
}

/// Guard that pops the context when dropped.
///
/// This keeps the stack balanced even if the effect panics.
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Make `subscriber` the active effect until the guard is dropped.
    pub fn enter(subscriber: Subscriber) -> Self {
        let subscriber_id = Some(subscriber.id());
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(Some(subscriber)));
        Self { subscriber_id }
    }

    /// Hide any active effect until the guard is dropped.
    pub fn suspend() -> Self {
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(None));
        Self { subscriber_id: None }
    }

    /// Check if an effect is active.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| matches!(stack.borrow().last(), Some(Some(_))))
    }

    /// The active effect, if any.
    pub fn current() -> Option<Subscriber> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned().flatten())
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .and_then(|frame| frame.as_ref().map(Subscriber::id))
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        // The stack is gone if this runs during thread teardown.
        let _ = CONTEXT_STACK.try_with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(frame) = popped {
                debug_assert_eq!(
                    frame.as_ref().map(Subscriber::id),
                    self.subscriber_id,
                    "ReactiveContext mismatch"
                );
            }
        });
    }
}

/// Run `f` with no active effect. Reads inside it are not tracked.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::suspend();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tracks_subscriber() {
        let subscriber = Subscriber::new(|| {});

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());

        {
            let _ctx = ReactiveContext::enter(subscriber.clone());

            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_subscriber(), Some(subscriber.id()));
        }

        // Context should be cleaned up after drop
        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn nested_contexts() {
        let outer = Subscriber::new(|| {});
        let inner = Subscriber::new(|| {});

        {
            let _ctx1 = ReactiveContext::enter(outer.clone());
            assert_eq!(ReactiveContext::current_subscriber(), Some(outer.id()));

            {
                let _ctx2 = ReactiveContext::enter(inner.clone());
                assert_eq!(ReactiveContext::current_subscriber(), Some(inner.id()));
            }

            // After inner context drops, outer should be current
            assert_eq!(ReactiveContext::current_subscriber(), Some(outer.id()));
        }

        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn untracked_hides_active_effect() {
        let subscriber = Subscriber::new(|| {});
        let _ctx = ReactiveContext::enter(subscriber.clone());

        let inside = untracked(ReactiveContext::current_subscriber);
        assert!(inside.is_none());
        assert_eq!(ReactiveContext::current_subscriber(), Some(subscriber.id()));
    }

    #[test]
    fn context_is_restored_after_panic() {
        let subscriber = Subscriber::new(|| {});

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ctx = ReactiveContext::enter(subscriber.clone());
            panic!("effect failed");
        }));

        assert!(result.is_err());
        assert!(!ReactiveContext::is_active());
    }
}
