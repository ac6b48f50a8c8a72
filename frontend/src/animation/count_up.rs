//! One-shot count-up animation, driven by visibility, a delay and frame ticks.
//!
//! The machine does not touch the browser. The driver in
//! `components::count_up` feeds it events and carries out the commands it
//! returns, so the whole lifecycle can be exercised with plain timestamps.

use crate::config;

#[derive(Debug, Clone, PartialEq)]
pub struct CountUpConfig {
    pub start: f64,
    pub end: f64,
    pub duration_ms: u32,
    pub delay_ms: u32,
    /// Display rounding only; interpolation keeps full precision.
    pub decimals: usize,
    pub prefix: String,
    pub suffix: String,
    /// Share of the element that must be visible before the count starts.
    pub threshold: f64,
}

impl CountUpConfig {
    pub fn new(end: f64) -> Self {
        Self {
            start: 0.0,
            end,
            duration_ms: config::COUNT_UP_DURATION_MS,
            delay_ms: 0,
            decimals: 0,
            prefix: String::new(),
            suffix: String::new(),
            threshold: config::VISIBILITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Not seen yet; showing `start`.
    Idle,
    /// Seen once; waiting for the delay to run out.
    Armed,
    Running { started_at: f64 },
    Settled,
    /// Host element is gone. Terminal, nothing mutates any more.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Visible,
    Hidden,
    DelayElapsed { now: f64 },
    Frame { now: f64 },
    Teardown,
}

/// Work the driver has to schedule on the machine's behalf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    StartDelay { delay_ms: u32 },
    RequestFrame,
}

#[derive(Debug, Clone)]
pub struct CountUp {
    config: CountUpConfig,
    phase: Phase,
    current: f64,
}

impl CountUp {
    pub fn new(config: CountUpConfig) -> Self {
        let current = config.start;
        Self {
            config,
            phase: Phase::Idle,
            current,
        }
    }

    pub fn step(&mut self, event: Event) -> Option<Command> {
        match (self.phase, event) {
            (Phase::Detached, _) => None,
            (_, Event::Teardown) => {
                self.phase = Phase::Detached;
                None
            }
            (Phase::Idle, Event::Visible) => {
                self.phase = Phase::Armed;
                Some(Command::StartDelay {
                    delay_ms: self.config.delay_ms,
                })
            }
            (Phase::Armed, Event::DelayElapsed { now }) => {
                self.phase = Phase::Running { started_at: now };
                Some(Command::RequestFrame)
            }
            (Phase::Running { started_at }, Event::Frame { now }) => self.tick(started_at, now),
            _ => None,
        }
    }

    fn tick(&mut self, started_at: f64, now: f64) -> Option<Command> {
        let duration = f64::from(self.config.duration_ms);
        if now < started_at + duration {
            // a frame stamped before the delay fired counts as no progress
            let progress = ((now - started_at) / duration).clamp(0.0, 1.0);
            let eased = ease_out_quart(progress);
            self.current = self.config.start + (self.config.end - self.config.start) * eased;
            Some(Command::RequestFrame)
        } else {
            // pin the target, the eased formula can land a hair off
            self.current = self.config.end;
            self.phase = Phase::Settled;
            None
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    pub fn formatted(&self) -> String {
        format!(
            "{}{}{}",
            self.config.prefix,
            to_fixed(self.current, self.config.decimals),
            self.config.suffix
        )
    }
}

/// Fast start, slow settle: `1 - (1 - p)^4`.
pub fn ease_out_quart(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(4)
}

/// Fixed-point rendering with ties rounded away from zero. Unlike the
/// browser's `toFixed`, a value that rounds to zero prints as "0", not "-0".
pub fn to_fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let mut rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:.*}", decimals, rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(start: f64, end: f64, duration_ms: u32) -> CountUpConfig {
        CountUpConfig {
            start,
            end,
            duration_ms,
            ..CountUpConfig::new(end)
        }
    }

    /// Runs the machine like the browser would, with frames every `frame_ms`.
    fn drive(count_up: &mut CountUp, visible_at: f64, frame_ms: f64) -> usize {
        let mut frames = 0;
        let delay = match count_up.step(Event::Visible) {
            Some(Command::StartDelay { delay_ms }) => f64::from(delay_ms),
            other => panic!("expected a delay, got {:?}", other),
        };
        let mut now = visible_at + delay;
        let mut next = count_up.step(Event::DelayElapsed { now });
        while next == Some(Command::RequestFrame) {
            now += frame_ms;
            frames += 1;
            next = count_up.step(Event::Frame { now });
        }
        frames
    }

    #[test]
    fn test_defaults() {
        let cfg = CountUpConfig::new(42.0);
        assert_eq!(cfg.start, 0.0);
        assert_eq!(cfg.duration_ms, 2000);
        assert_eq!(cfg.delay_ms, 0);
        assert_eq!(cfg.decimals, 0);
        assert_eq!(cfg.threshold, 0.3);
        assert_eq!(CountUp::new(cfg).formatted(), "0");
    }

    #[test]
    fn test_idle_until_visible() {
        let mut count_up = CountUp::new(config(5.0, 10.0, 1000));
        assert_eq!(count_up.step(Event::Hidden), None);
        assert_eq!(count_up.step(Event::Frame { now: 500.0 }), None);
        assert_eq!(count_up.step(Event::DelayElapsed { now: 500.0 }), None);
        assert_eq!(count_up.phase(), Phase::Idle);
        assert_eq!(count_up.current(), 5.0);
    }

    #[test]
    fn test_visible_arms_with_delay() {
        let mut count_up = CountUp::new(CountUpConfig {
            delay_ms: 300,
            ..CountUpConfig::new(10.0)
        });
        assert_eq!(
            count_up.step(Event::Visible),
            Some(Command::StartDelay { delay_ms: 300 })
        );
        assert_eq!(count_up.phase(), Phase::Armed);
    }

    #[test]
    fn test_visible_again_does_not_rearm() {
        let mut count_up = CountUp::new(config(0.0, 100.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::DelayElapsed { now: 0.0 });
        count_up.step(Event::Frame { now: 400.0 });
        let midway = count_up.current();
        assert!(midway > 0.0);

        assert_eq!(count_up.step(Event::Hidden), None);
        assert_eq!(count_up.step(Event::Visible), None);
        assert_eq!(count_up.current(), midway);
        assert_eq!(count_up.phase(), Phase::Running { started_at: 0.0 });

        count_up.step(Event::Frame { now: 1000.0 });
        assert!(count_up.is_settled());
        assert_eq!(count_up.step(Event::Visible), None);
        assert_eq!(count_up.current(), 100.0);
    }

    #[test]
    fn test_eased_progress() {
        let mut count_up = CountUp::new(config(0.0, 100.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::DelayElapsed { now: 1000.0 });
        assert_eq!(
            count_up.step(Event::Frame { now: 1500.0 }),
            Some(Command::RequestFrame)
        );
        // 1 - 0.5^4
        assert!((count_up.current() - 93.75).abs() < 1e-9);
    }

    #[test]
    fn test_frame_stamped_before_start_stays_at_start() {
        let mut count_up = CountUp::new(config(0.0, 100.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::DelayElapsed { now: 1000.0 });
        assert_eq!(
            count_up.step(Event::Frame { now: 990.0 }),
            Some(Command::RequestFrame)
        );
        assert_eq!(count_up.current(), 0.0);
        assert_eq!(count_up.formatted(), "0");

        count_up.step(Event::Frame { now: 1500.0 });
        assert!((count_up.current() - 93.75).abs() < 1e-9);
    }

    #[test]
    fn test_counts_down() {
        let mut count_up = CountUp::new(config(100.0, 0.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::DelayElapsed { now: 0.0 });
        count_up.step(Event::Frame { now: 500.0 });
        assert!((count_up.current() - 6.25).abs() < 1e-9);
    }

    #[test]
    fn test_settles_exactly_on_end() {
        for (end, duration) in [(100.0, 1000), (0.1 + 0.2, 333), (1e9 / 3.0, 2000), (-7.77, 17)] {
            let mut count_up = CountUp::new(config(0.0, end, duration));
            drive(&mut count_up, 0.0, 16.7);
            assert!(count_up.is_settled());
            assert_eq!(count_up.current(), end);
        }
    }

    #[test]
    fn test_zero_duration_settles_on_first_frame() {
        let mut count_up = CountUp::new(config(0.0, 12.0, 0));
        let frames = drive(&mut count_up, 0.0, 16.0);
        assert_eq!(frames, 1);
        assert_eq!(count_up.current(), 12.0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut count_up = CountUp::new(config(0.0, 100.0, 1000));
        assert!(count_up.step(Event::Visible).is_some());
        assert_eq!(
            count_up.step(Event::DelayElapsed { now: 0.0 }),
            Some(Command::RequestFrame)
        );
        assert_eq!(count_up.step(Event::Frame { now: 1000.0 }), None);
        assert_eq!(count_up.formatted(), "100");
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut count_up = CountUp::new(config(0.0, 100.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::DelayElapsed { now: 0.0 });

        let mut scheduled = 0;
        for now in [100.0, 200.0] {
            if count_up.step(Event::Frame { now }).is_some() {
                scheduled += 1;
            }
        }
        assert_eq!(scheduled, 2);

        let before = count_up.current();
        assert_eq!(count_up.step(Event::Teardown), None);
        assert_eq!(count_up.phase(), Phase::Detached);

        for event in [
            Event::Frame { now: 300.0 },
            Event::Frame { now: 5000.0 },
            Event::DelayElapsed { now: 300.0 },
            Event::Visible,
            Event::Teardown,
        ] {
            if count_up.step(event).is_some() {
                scheduled += 1;
            }
        }
        assert_eq!(scheduled, 2);
        assert_eq!(count_up.current(), before);
    }

    #[test]
    fn test_teardown_while_armed() {
        let mut count_up = CountUp::new(config(3.0, 9.0, 1000));
        count_up.step(Event::Visible);
        count_up.step(Event::Teardown);
        assert_eq!(count_up.step(Event::DelayElapsed { now: 10.0 }), None);
        assert_eq!(count_up.current(), 3.0);
    }

    #[test]
    fn test_formatted_decoration_and_decimals() {
        let mut count_up = CountUp::new(CountUpConfig {
            decimals: 1,
            prefix: "$".to_string(),
            suffix: "M".to_string(),
            duration_ms: 1000,
            ..CountUpConfig::new(2.5)
        });
        assert_eq!(count_up.formatted(), "$0.0M");
        drive(&mut count_up, 0.0, 50.0);
        assert_eq!(count_up.formatted(), "$2.5M");
    }

    #[test]
    fn test_ease_out_quart() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        assert!(ease_out_quart(0.25) > 0.25);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(99.6, 0), "100");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-0.2, 0), "0");
        assert_eq!(to_fixed(1.25, 1), "1.3");
        assert_eq!(to_fixed(7.0, 2), "7.00");
    }
}
