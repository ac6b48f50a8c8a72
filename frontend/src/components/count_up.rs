use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;
use yew::html::IntoPropValue;
use yew::prelude::*;

use crate::animation::count_up::{Command, CountUp as Machine, CountUpConfig, Event};
use crate::animation::stat::{parse_stat, Stat};
use crate::animation::visibility::VisibilityObserver;

/// What a counter counts to: a plain number or a stat label like "78%".
#[derive(Debug, Clone, PartialEq)]
pub enum StatSource {
    Number(f64),
    Label(AttrValue),
}

impl IntoPropValue<StatSource> for f64 {
    fn into_prop_value(self) -> StatSource {
        StatSource::Number(self)
    }
}

impl IntoPropValue<StatSource> for &'static str {
    fn into_prop_value(self) -> StatSource {
        StatSource::Label(AttrValue::Static(self))
    }
}

impl IntoPropValue<StatSource> for String {
    fn into_prop_value(self) -> StatSource {
        StatSource::Label(AttrValue::from(self))
    }
}

/// Unset timing props fall back to `CountUpConfig::new`.
#[derive(Properties, PartialEq)]
pub struct CountUpProps {
    pub value: StatSource,
    #[prop_or_default]
    pub start: Option<f64>,
    #[prop_or_default]
    pub duration_ms: Option<u32>,
    #[prop_or_default]
    pub delay_ms: Option<u32>,
    /// Defaults to the precision written in the label, or 0 for numbers.
    #[prop_or_default]
    pub decimals: Option<usize>,
    #[prop_or_default]
    pub prefix: AttrValue,
    #[prop_or_default]
    pub suffix: AttrValue,
    #[prop_or_default]
    pub threshold: Option<f64>,
    #[prop_or_default]
    pub class: Classes,
}

impl CountUpProps {
    /// Fails with the parsed stat when the label is literal text that must not animate.
    fn animation_config(&self) -> Result<CountUpConfig, Stat> {
        let mut config = match &self.value {
            StatSource::Number(end) => CountUpConfig {
                prefix: self.prefix.to_string(),
                suffix: self.suffix.to_string(),
                ..CountUpConfig::new(*end)
            },
            StatSource::Label(label) => match parse_stat(label) {
                Stat::Numeric {
                    value,
                    prefix,
                    suffix,
                    decimals,
                } => CountUpConfig {
                    decimals,
                    prefix,
                    suffix,
                    ..CountUpConfig::new(value)
                },
                literal => return Err(literal),
            },
        };

        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(duration_ms) = self.duration_ms {
            config.duration_ms = duration_ms;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(decimals) = self.decimals {
            config.decimals = decimals;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        Ok(config)
    }
}

/// Animated statistic. Labels such as "24/7" are shown as written.
#[function_component(CountUp)]
pub fn count_up(props: &CountUpProps) -> Html {
    match props.animation_config() {
        Ok(config) => html! {
            <CountUpNumber {config} class={props.class.clone()} />
        },
        Err(literal) => html! {
            <span class={props.class.clone()}>{literal.to_string()}</span>
        },
    }
}

#[derive(Properties, PartialEq)]
struct CountUpNumberProps {
    config: CountUpConfig,
    #[prop_or_default]
    class: Classes,
}

#[function_component(CountUpNumber)]
fn count_up_number(props: &CountUpNumberProps) -> Html {
    let (node, text) = use_count_up(props.config.clone());
    html! {
        <span ref={node} class={props.class.clone()}>{text}</span>
    }
}

/// Runs a count-up on the element the returned ref is attached to and yields
/// the text to display.
#[hook]
pub fn use_count_up(config: CountUpConfig) -> (NodeRef, String) {
    let node = use_node_ref();
    let display = {
        let config = config.clone();
        use_state_eq(move || Machine::new(config).formatted())
    };

    {
        let node = node.clone();
        let display = display.clone();
        use_effect_with_deps(
            move |config: &CountUpConfig| {
                let driver = node.cast::<Element>().and_then(|element| {
                    CountUpDriver::start(&element, config.clone(), move |text| display.set(text))
                        .map_err(|err| warn!("Count-up could not observe its element: {:?}", err))
                        .ok()
                });
                move || drop(driver)
            },
            config,
        );
    }

    (node, (*display).clone())
}

struct DriverState {
    machine: RefCell<Machine>,
    render: Box<dyn Fn(String)>,
    observer: RefCell<Option<VisibilityObserver>>,
    timeout: RefCell<Option<Timeout>>,
    frame_id: Cell<Option<i32>>,
    frame_callback: Closure<dyn FnMut(f64)>,
}

/// Connects a count-up machine to the browser: visibility observer, delay
/// timer and animation frames. Callbacks only hold weak references, so
/// dropping the driver releases everything and nothing fires afterwards.
struct CountUpDriver {
    state: Rc<DriverState>,
}

impl CountUpDriver {
    fn start<F>(element: &Element, config: CountUpConfig, render: F) -> Result<Self, JsValue>
    where
        F: Fn(String) + 'static,
    {
        let threshold = config.threshold;
        let state = Rc::new_cyclic(|weak: &Weak<DriverState>| {
            let weak = weak.clone();
            DriverState {
                machine: RefCell::new(Machine::new(config)),
                render: Box::new(render),
                observer: RefCell::new(None),
                timeout: RefCell::new(None),
                frame_id: Cell::new(None),
                frame_callback: Closure::wrap(Box::new(move |timestamp: f64| {
                    if let Some(state) = weak.upgrade() {
                        state.frame_id.set(None);
                        dispatch(&state, Event::Frame { now: timestamp });
                    }
                }) as Box<dyn FnMut(f64)>),
            }
        });

        (state.render)(state.machine.borrow().formatted());

        let weak = Rc::downgrade(&state);
        let observer = VisibilityObserver::observe(element, threshold, None, move |intersecting| {
            if let Some(state) = weak.upgrade() {
                let event = if intersecting { Event::Visible } else { Event::Hidden };
                dispatch(&state, event);
            }
        })?;
        *state.observer.borrow_mut() = Some(observer);

        Ok(Self { state })
    }
}

impl Drop for CountUpDriver {
    fn drop(&mut self) {
        {
            let mut machine = self.state.machine.borrow_mut();
            debug!("Count-up torn down in {:?}", machine.phase());
            machine.step(Event::Teardown);
        }
        if let Some(id) = self.state.frame_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        // gloo's Timeout clears itself on drop
        self.state.timeout.borrow_mut().take();
        self.state.observer.borrow_mut().take();
    }
}

fn dispatch(state: &Rc<DriverState>, event: Event) {
    let (command, text) = {
        let mut machine = state.machine.borrow_mut();
        let was_settled = machine.is_settled();
        let command = machine.step(event);
        if machine.is_settled() && !was_settled {
            debug!("Count-up settled at {}", machine.current());
        }
        (command, machine.formatted())
    };

    match command {
        Some(Command::StartDelay { delay_ms }) => {
            debug!("Count-up visible, starting in {}ms", delay_ms);
            let weak = Rc::downgrade(state);
            let timeout = Timeout::new(delay_ms, move || {
                if let Some(state) = weak.upgrade() {
                    dispatch(&state, Event::DelayElapsed { now: now() });
                }
            });
            *state.timeout.borrow_mut() = Some(timeout);
        }
        Some(Command::RequestFrame) => request_frame(state),
        None => {}
    }

    // last, so a re-render that unmounts the host still cancels what was just scheduled
    (state.render)(text);
}

fn request_frame(state: &DriverState) {
    let window = match web_sys::window() {
        Some(window) => window,
        None => return,
    };
    match window.request_animation_frame(state.frame_callback.as_ref().unchecked_ref()) {
        Ok(id) => state.frame_id.set(Some(id)),
        Err(err) => warn!("requestAnimationFrame failed: {:?}", err),
    }
}

/// Same clock as animation frame timestamps.
fn now() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(value: StatSource) -> CountUpProps {
        CountUpProps {
            value,
            start: None,
            duration_ms: None,
            delay_ms: None,
            decimals: None,
            prefix: AttrValue::default(),
            suffix: AttrValue::default(),
            threshold: None,
            class: Classes::new(),
        }
    }

    #[test]
    fn test_label_config() {
        let config = props("78%".into_prop_value()).animation_config().unwrap();
        assert_eq!(config.end, 78.0);
        assert_eq!(config.suffix, "%");
        assert_eq!(config.prefix, "");
    }

    #[test]
    fn test_unset_props_use_machine_defaults() {
        let config = props(40.0.into_prop_value()).animation_config().unwrap();
        assert_eq!(config, CountUpConfig::new(40.0));
    }

    #[test]
    fn test_set_props_override_defaults() {
        let mut custom = props("15+".into_prop_value());
        custom.start = Some(5.0);
        custom.duration_ms = Some(800);
        custom.delay_ms = Some(150);
        custom.threshold = Some(0.5);
        let config = custom.animation_config().unwrap();
        assert_eq!(config.start, 5.0);
        assert_eq!(config.duration_ms, 800);
        assert_eq!(config.delay_ms, 150);
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.suffix, "+");
    }

    #[test]
    fn test_label_keeps_written_precision() {
        let config = props("$2.5M".into_prop_value()).animation_config().unwrap();
        assert_eq!(config.decimals, 1);

        let mut overridden = props("$2.5M".into_prop_value());
        overridden.decimals = Some(0);
        assert_eq!(overridden.animation_config().unwrap().decimals, 0);
    }

    #[test]
    fn test_literal_label_skips_animation() {
        let literal = props("24/7".into_prop_value()).animation_config().unwrap_err();
        assert_eq!(literal.to_string(), "24/7");
        assert!(props("Award winning".into_prop_value()).animation_config().is_err());
    }

    #[test]
    fn test_range_label_animates() {
        let config = props("5-7".into_prop_value()).animation_config().unwrap();
        assert_eq!(config.end, 7.0);
    }

    #[test]
    fn test_number_uses_prop_decoration() {
        let mut number = props(250.0.into_prop_value());
        number.prefix = AttrValue::Static("+");
        number.suffix = AttrValue::Static(" homes");
        let config = number.animation_config().unwrap();
        assert_eq!(config.end, 250.0);
        assert_eq!(config.prefix, "+");
        assert_eq!(config.suffix, " homes");
        assert_eq!(Machine::new(config).formatted(), "+0 homes");
    }
}
