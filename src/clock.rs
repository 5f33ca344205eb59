/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::{cell::Cell, rc::Rc};

use web_time::{Duration, Instant};

pub trait TimeSource {
    fn restart(&mut self);
    /// Seconds elapsed since the last [`TimeSource::restart`].
    fn elapsed_secs(&self) -> f64;
}

pub struct SystemTime {
    start: Instant,
}

impl Default for SystemTime {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimeSource for SystemTime {
    fn restart(&mut self) {
        self.start = Instant::now();
    }
    fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Time source advanced by hand. Clones share the same time value, so one
/// copy can be given to a [`Clock`] while another one drives it.
#[derive(Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<f64>>,
    origin: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }
    pub fn advance(&self, step: Duration) {
        self.now.set(self.now.get() + step.as_secs_f64());
    }
}

impl TimeSource for ManualTime {
    fn restart(&mut self) {
        self.origin.set(self.now.get());
    }
    fn elapsed_secs(&self) -> f64 {
        self.now.get() - self.origin.get()
    }
}

pub struct Clock {
    source: Box<dyn TimeSource>,
    started: bool,
    last_sample: Option<f64>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(SystemTime::default())
    }
}

impl Clock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            started: false,
            last_sample: None,
        }
    }

    /// Starts counting from zero. Later calls keep the running count so that
    /// samples never go backwards.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.source.restart();
        self.started = true;
    }

    /// Returns the elapsed seconds, strictly greater than the previous sample.
    pub fn sample(&mut self) -> f64 {
        let raw = self.source.elapsed_secs().max(0.0);
        let sample = match self.last_sample {
            Some(last) if raw <= last => next_after(last),
            _ => raw,
        };
        self.last_sample = Some(sample);
        sample
    }
}

fn next_after(value: f64) -> f64 {
    // value is never negative here, so the next bit pattern is the next float.
    f64::from_bits(value.to_bits() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_time_drives_clock() {
        let time = ManualTime::default();
        let mut clock = Clock::new(time.clone());
        clock.start();
        assert_eq!(clock.sample(), 0.0);
        time.advance(Duration::from_millis(500));
        assert!((clock.sample() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn samples_are_strictly_increasing_when_time_stalls() {
        let time = ManualTime::default();
        let mut clock = Clock::new(time.clone());
        clock.start();
        let first = clock.sample();
        let second = clock.sample();
        let third = clock.sample();
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn restart_is_ignored_once_started() {
        let time = ManualTime::default();
        let mut clock = Clock::new(time.clone());
        clock.start();
        time.set(2.0);
        clock.start();
        assert!((clock.sample() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn clock_starts_at_zero() {
        let time = ManualTime::default();
        time.set(10.0);
        let mut clock = Clock::new(time.clone());
        clock.start();
        assert_eq!(clock.sample(), 0.0);
    }
}
