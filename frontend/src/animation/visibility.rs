use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};
use yew::prelude::*;

use crate::config;

/// An `IntersectionObserver` watching a single element.
///
/// Dropping it disconnects the observer and frees the callback, so no
/// visibility change is delivered afterwards.
pub struct VisibilityObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl VisibilityObserver {
    pub fn observe<F>(
        element: &Element,
        threshold: f64,
        root_margin: Option<&str>,
        mut on_change: F,
    ) -> Result<Self, JsValue>
    where
        F: FnMut(bool) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |entries: Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    on_change(entry.is_intersecting());
                }
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        if let Some(margin) = root_margin {
            options.set_root_margin(margin);
        }

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        observer.observe(element);
        debug!("Observing element visibility at threshold {}", threshold);

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Decides whether a reveal-on-scroll section is shown.
///
/// With `once` set the first intersection latches it on for good, otherwise
/// it follows the element in and out of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealGate {
    once: bool,
    revealed: bool,
}

impl RevealGate {
    pub fn new(once: bool) -> Self {
        Self { once, revealed: false }
    }

    /// Returns true when `revealed` changed.
    pub fn update(&mut self, intersecting: bool) -> bool {
        let next = if self.once {
            self.revealed || intersecting
        } else {
            intersecting
        };
        let changed = next != self.revealed;
        self.revealed = next;
        changed
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: Option<String>,
    pub once: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: config::VISIBILITY_THRESHOLD,
            root_margin: None,
            once: true,
        }
    }
}

/// Attach the returned ref to an element; the flag turns true once it scrolls into view.
#[hook]
pub fn use_scroll_reveal(options: RevealOptions) -> (NodeRef, bool) {
    let node = use_node_ref();
    let revealed = use_state_eq(|| false);

    {
        let node = node.clone();
        let revealed = revealed.clone();
        use_effect_with_deps(
            move |options: &RevealOptions| {
                let mut gate = RevealGate::new(options.once);
                let observer = node.cast::<Element>().and_then(|element| {
                    VisibilityObserver::observe(
                        &element,
                        options.threshold,
                        options.root_margin.as_deref(),
                        move |intersecting| {
                            if gate.update(intersecting) {
                                revealed.set(gate.revealed());
                            }
                        },
                    )
                    .map_err(|err| warn!("Failed to observe reveal section: {:?}", err))
                    .ok()
                });
                move || drop(observer)
            },
            options,
        );
    }

    (node, *revealed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_latches() {
        let mut gate = RevealGate::new(true);
        assert!(!gate.update(false));
        assert!(gate.update(true));
        assert!(!gate.update(false));
        assert!(gate.revealed());
        assert!(!gate.update(true));
    }

    #[test]
    fn test_follows_visibility_without_once() {
        let mut gate = RevealGate::new(false);
        assert!(gate.update(true));
        assert!(gate.update(false));
        assert!(!gate.revealed());
        assert!(!gate.update(false));
    }

    #[test]
    fn test_default_options() {
        let options = RevealOptions::default();
        assert_eq!(options.threshold, 0.3);
        assert!(options.once);
        assert_eq!(options.root_margin, None);
    }
}
