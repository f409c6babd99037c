//! Frame-driven tween scheduler
//!
//! Tweens live in an arena of slots addressed by generational [`TweenHandle`]s.
//! A tween refers to its target by key rather than by reference; the key is
//! resolved through [`TweenTargets`] on every update, and a key that no longer
//! resolves ends the tween silently.
//!
//! Lifecycle per tween: pending (waiting out its delay) → active (start values
//! captured from the live target) → complete (progress reached 1, `on_complete`
//! fired) or stopped (removed early, no callback).
//!
//! Two tweens driving the same channel of the same target are not reconciled;
//! whichever updates last in a frame wins.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::hash::Hash;
use std::time::{Duration, Instant};

use super::easing::Easing;
use crate::core::clock::{system_clock, SharedClock};

/// A single animatable scalar of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Channel {
    pub const SCALE: [Channel; 3] = [Channel::ScaleX, Channel::ScaleY, Channel::ScaleZ];
    pub const POSITION: [Channel; 3] = [Channel::PositionX, Channel::PositionY, Channel::PositionZ];
    pub const ROTATION: [Channel; 3] = [Channel::RotationX, Channel::RotationY, Channel::RotationZ];
}

/// Something whose channels can be read and written by a tween
pub trait Animatable {
    /// Current value, or `None` if the channel is not supported
    fn channel(&self, channel: Channel) -> Option<f32>;
    fn set_channel(&mut self, channel: Channel, value: f32);
}

/// Resolves tween keys to live targets
pub trait TweenTargets<K> {
    fn animatable_mut(&mut self, key: &K) -> Option<&mut dyn Animatable>;
}

impl<K: Eq + Hash, A: Animatable> TweenTargets<K> for HashMap<K, A> {
    fn animatable_mut(&mut self, key: &K) -> Option<&mut dyn Animatable> {
        self.get_mut(key).map(|a| a as &mut dyn Animatable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EndValue {
    To(f32),
    By(f32),
}

/// Requested end values, absolute or relative to the captured start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndValues {
    entries: Vec<(Channel, EndValue)>,
}

impl EndValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, channel: Channel, value: f32) -> Self {
        self.entries.push((channel, EndValue::To(value)));
        self
    }

    /// End at start + `delta`, where start is read when the tween activates
    pub fn by(mut self, channel: Channel, delta: f32) -> Self {
        self.entries.push((channel, EndValue::By(delta)));
        self
    }

    pub fn uniform_scale(self, scale: f32) -> Self {
        Channel::SCALE.into_iter().fold(self, |v, c| v.to(c, scale))
    }

    pub fn position(self, position: [f32; 3]) -> Self {
        Channel::POSITION
            .into_iter()
            .zip(position)
            .fold(self, |v, (c, p)| v.to(c, p))
    }

    pub fn rotation(self, rotation: [f32; 3]) -> Self {
        Channel::ROTATION
            .into_iter()
            .zip(rotation)
            .fold(self, |v, (c, r)| v.to(c, r))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Timing, easing and callbacks for one tween
pub struct AnimateOptions {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
    on_update: Option<Box<dyn FnMut(f32)>>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1000),
            easing: Easing::default(),
            delay: Duration::ZERO,
            on_update: None,
            on_complete: None,
        }
    }
}

impl AnimateOptions {
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn duration_ms(self, ms: u64) -> Self {
        self.duration(Duration::from_millis(ms))
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Called after every applied step with the raw (un-eased) progress
    pub fn on_update(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called once after the final step; never called for stopped tweens
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

/// Stable reference to a scheduled tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    /// Waiting out its delay; start values not yet captured
    Pending,
    Active,
}

struct Track {
    channel: Channel,
    start: f32,
    end: f32,
}

struct Tween<K> {
    target: K,
    values: EndValues,
    tracks: Vec<Track>,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    created_at: Instant,
    started_at: Option<Instant>,
    on_update: Option<Box<dyn FnMut(f32)>>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl<K> Tween<K> {
    fn activate(&mut self, target: &dyn Animatable, at: Instant) {
        // channels the target does not expose are skipped
        self.tracks = self
            .values
            .entries
            .iter()
            .filter_map(|&(channel, end)| {
                let start = target.channel(channel)?;
                let end = match end {
                    EndValue::To(value) => value,
                    EndValue::By(delta) => start + delta,
                };
                Some(Track {
                    channel,
                    start,
                    end,
                })
            })
            .collect();
        self.started_at = Some(at);
    }

    fn progress(&self, now: Instant) -> f32 {
        let Some(started) = self.started_at else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }

    fn apply(&self, target: &mut dyn Animatable, progress: f32) {
        let eased = self.easing.apply(progress);
        for track in &self.tracks {
            let value = track.start * (1.0 - eased) + track.end * eased;
            target.set_channel(track.channel, value);
        }
    }
}

struct Slot<K> {
    generation: u32,
    tween: Option<Tween<K>>,
}

/// Tween scheduler advanced once per frame
pub struct AnimationSystem<K> {
    clock: SharedClock,
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
}

impl<K> AnimationSystem<K> {
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            clock,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Schedules a tween of `target` towards `values`
    ///
    /// Start values are read from the target when the delay has elapsed, on
    /// the first [`update`](Self::update) at or after that moment.
    pub fn animate(&mut self, target: K, values: EndValues, options: AnimateOptions) -> TweenHandle {
        let tween = Tween {
            target,
            values,
            tracks: Vec::new(),
            duration: options.duration,
            delay: options.delay,
            easing: options.easing,
            created_at: self.clock.now(),
            started_at: None,
            on_update: options.on_update,
            on_complete: options.on_complete,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].tween = Some(tween);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    tween: Some(tween),
                });
                self.slots.len() - 1
            }
        };

        TweenHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Grows `target` to a uniform `scale` with an overshooting ease-out
    pub fn animate_scale(&mut self, target: K, scale: f32, duration: Duration) -> TweenHandle {
        self.animate(
            target,
            EndValues::new().uniform_scale(scale),
            AnimateOptions::default()
                .duration(duration)
                .easing(Easing::back_out()),
        )
    }

    /// Spins `target` about Y by `turns` full revolutions from its current angle
    pub fn animate_rotation(&mut self, target: K, turns: f32, duration: Duration) -> TweenHandle {
        self.animate(
            target,
            EndValues::new().by(Channel::RotationY, TAU * turns),
            AnimateOptions::default().duration(duration),
        )
    }

    /// Advances every tween to the current clock time
    ///
    /// # Returns
    /// Number of tweens that completed during this update
    pub fn update<T>(&mut self, targets: &mut T) -> usize
    where
        T: TweenTargets<K> + ?Sized,
    {
        let now = self.clock.now();
        let mut finished = Vec::new();
        let mut orphaned = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(tween) = slot.tween.as_mut() else {
                continue;
            };
            let Some(target) = targets.animatable_mut(&tween.target) else {
                orphaned.push(index);
                continue;
            };

            if tween.started_at.is_none() {
                let start_at = tween.created_at + tween.delay;
                if now < start_at {
                    continue;
                }
                tween.activate(target, start_at);
            }

            let progress = tween.progress(now);
            tween.apply(target, progress);
            if let Some(on_update) = tween.on_update.as_mut() {
                on_update(progress);
            }
            if progress >= 1.0 {
                finished.push(index);
            }
        }

        for index in orphaned {
            self.release(index);
            log::debug!("Tween {} dropped: target no longer exists", index);
        }

        let completed = finished.len();
        for index in finished {
            if let Some(on_complete) = self.release(index).and_then(|t| t.on_complete) {
                on_complete();
            }
        }
        completed
    }

    /// Cancels a tween without firing its completion callback
    pub fn stop(&mut self, handle: TweenHandle) -> bool {
        if self.resolve(handle).is_none() {
            return false;
        }
        self.release(handle.index as usize).is_some()
    }

    /// Cancels every tween driving `target`
    pub fn stop_all_for(&mut self, target: &K) -> usize
    where
        K: PartialEq,
    {
        let indices: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.tween.as_ref().is_some_and(|t| &t.target == target))
            .map(|(index, _)| index)
            .collect();
        for &index in &indices {
            self.release(index);
        }
        indices.len()
    }

    /// True while any tween, pending or running, drives `target`
    pub fn is_animating(&self, target: &K) -> bool
    where
        K: PartialEq,
    {
        self.slots
            .iter()
            .any(|slot| slot.tween.as_ref().is_some_and(|t| &t.target == target))
    }

    /// Drops every tween without completion callbacks
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            self.release(index);
        }
    }

    pub fn state(&self, handle: TweenHandle) -> Option<TweenState> {
        self.resolve(handle).map(|tween| match tween.started_at {
            Some(_) => TweenState::Active,
            None => TweenState::Pending,
        })
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Number of scheduled tweens, pending ones included
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.tween.is_some()).count()
    }

    fn resolve(&self, handle: TweenHandle) -> Option<&Tween<K>> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.tween.as_ref()
    }

    fn release(&mut self, index: usize) -> Option<Tween<K>> {
        let slot = self.slots.get_mut(index)?;
        let tween = slot.tween.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(tween)
    }
}

impl<K> Default for AnimationSystem<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Dummy {
        scale: [f32; 3],
        rotation_y: f32,
    }

    impl Animatable for Dummy {
        fn channel(&self, channel: Channel) -> Option<f32> {
            match channel {
                Channel::ScaleX => Some(self.scale[0]),
                Channel::ScaleY => Some(self.scale[1]),
                Channel::ScaleZ => Some(self.scale[2]),
                Channel::RotationY => Some(self.rotation_y),
                _ => None,
            }
        }

        fn set_channel(&mut self, channel: Channel, value: f32) {
            match channel {
                Channel::ScaleX => self.scale[0] = value,
                Channel::ScaleY => self.scale[1] = value,
                Channel::ScaleZ => self.scale[2] = value,
                Channel::RotationY => self.rotation_y = value,
                _ => {}
            }
        }
    }

    fn setup() -> (ManualClock, AnimationSystem<&'static str>, HashMap<&'static str, Dummy>) {
        let clock = ManualClock::new();
        let system = AnimationSystem::with_clock(Rc::new(clock.clone()));
        let mut targets = HashMap::new();
        targets.insert(
            "tree",
            Dummy {
                scale: [0.1; 3],
                rotation_y: 0.0,
            },
        );
        (clock, system, targets)
    }

    #[test]
    fn test_scale_tween_hits_exact_end_value() {
        let (clock, mut system, mut targets) = setup();
        let options = AnimateOptions::default().duration_ms(500);
        system.animate("tree", EndValues::new().uniform_scale(1.0), options);

        system.update(&mut targets);
        assert!((targets["tree"].scale[0] - 0.1).abs() < 1e-6);

        let mut previous = targets["tree"].scale[0];
        for _ in 0..9 {
            clock.advance_ms(50);
            system.update(&mut targets);
            let current = targets["tree"].scale[0];
            assert!(current > previous, "{} should exceed {}", current, previous);
            previous = current;
        }

        clock.advance_ms(50);
        assert_eq!(system.update(&mut targets), 1);
        assert_eq!(targets["tree"].scale, [1.0; 3]);
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn test_back_out_scale_completes_at_one() {
        let (clock, mut system, mut targets) = setup();
        system.animate_scale("tree", 1.0, Duration::from_millis(500));

        system.update(&mut targets);
        clock.advance_ms(600);
        system.update(&mut targets);
        assert_eq!(targets["tree"].scale[1], 1.0);
    }

    #[test]
    fn test_completion_callback_fires_once() {
        let (clock, mut system, mut targets) = setup();
        let completed = Rc::new(Cell::new(0));
        let c = completed.clone();
        system.animate(
            "tree",
            EndValues::new().uniform_scale(2.0),
            AnimateOptions::default()
                .duration_ms(100)
                .on_complete(move || c.set(c.get() + 1)),
        );

        clock.advance_ms(150);
        system.update(&mut targets);
        system.update(&mut targets);
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn test_on_update_reports_raw_progress() {
        let (clock, mut system, mut targets) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        system.animate(
            "tree",
            EndValues::new().uniform_scale(1.0),
            AnimateOptions::default()
                .duration_ms(200)
                .easing(Easing::back_out())
                .on_update(move |p| s.borrow_mut().push(p)),
        );

        system.update(&mut targets);
        clock.advance_ms(100);
        system.update(&mut targets);
        clock.advance_ms(100);
        system.update(&mut targets);
        assert_eq!(*seen.borrow(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_stopped_tween_skips_completion() {
        let (clock, mut system, mut targets) = setup();
        let completed = Rc::new(Cell::new(false));
        let c = completed.clone();
        let handle = system.animate(
            "tree",
            EndValues::new().uniform_scale(1.0),
            AnimateOptions::default()
                .duration_ms(100)
                .on_complete(move || c.set(true)),
        );

        system.update(&mut targets);
        assert!(system.stop(handle));
        assert!(!system.stop(handle));
        clock.advance_ms(200);
        system.update(&mut targets);
        assert!(!completed.get());
        assert!(targets["tree"].scale[0] < 1.0);
    }

    #[test]
    fn test_delayed_tween_captures_start_on_activation() {
        let (clock, mut system, mut targets) = setup();
        let handle = system.animate(
            "tree",
            EndValues::new().uniform_scale(1.0),
            AnimateOptions::default()
                .duration_ms(100)
                .delay(Duration::from_millis(300))
                .easing(Easing::Linear),
        );

        system.update(&mut targets);
        assert_eq!(system.state(handle), Some(TweenState::Pending));

        // changed while pending: the tween must start from this value
        targets.get_mut("tree").unwrap().scale = [0.5; 3];
        clock.advance_ms(300);
        system.update(&mut targets);
        assert_eq!(system.state(handle), Some(TweenState::Active));
        assert_eq!(targets["tree"].scale[0], 0.5);

        clock.advance_ms(50);
        system.update(&mut targets);
        assert!((targets["tree"].scale[0] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_stopping_pending_tween_leaves_target_untouched() {
        let (clock, mut system, mut targets) = setup();
        let handle = system.animate(
            "tree",
            EndValues::new().uniform_scale(3.0),
            AnimateOptions::default().delay(Duration::from_millis(100)),
        );

        system.stop(handle);
        clock.advance_ms(5000);
        system.update(&mut targets);
        assert_eq!(targets["tree"].scale, [0.1; 3]);
    }

    #[test]
    fn test_relative_rotation_adds_full_turn() {
        let (clock, mut system, mut targets) = setup();
        targets.get_mut("tree").unwrap().rotation_y = 0.5;
        system.animate_rotation("tree", 1.0, Duration::from_millis(500));

        system.update(&mut targets);
        clock.advance_ms(500);
        system.update(&mut targets);
        assert!((targets["tree"].rotation_y - (0.5 + TAU)).abs() < 1e-5);
    }

    #[test]
    fn test_missing_target_ends_tween_silently() {
        let (clock, mut system, mut targets) = setup();
        let completed = Rc::new(Cell::new(false));
        let c = completed.clone();
        let handle = system.animate(
            "tree",
            EndValues::new().uniform_scale(1.0),
            AnimateOptions::default().on_complete(move || c.set(true)),
        );

        targets.remove("tree");
        clock.advance_ms(2000);
        system.update(&mut targets);
        assert!(!system.is_active(handle));
        assert!(!completed.get());
    }

    #[test]
    fn test_stale_handle_does_not_touch_reused_slot() {
        let (_clock, mut system, _targets) = setup();
        let old = system.animate("tree", EndValues::new(), AnimateOptions::default());
        system.stop(old);
        let new = system.animate("tree", EndValues::new(), AnimateOptions::default());

        assert!(!system.stop(old));
        assert!(system.is_active(new));
    }

    #[test]
    fn test_clear_and_stop_all_for() {
        let (_clock, mut system, _targets) = setup();
        system.animate("tree", EndValues::new(), AnimateOptions::default());
        system.animate("tree", EndValues::new(), AnimateOptions::default());
        system.animate("lamp", EndValues::new(), AnimateOptions::default());

        assert_eq!(system.stop_all_for(&"tree"), 2);
        assert_eq!(system.active_count(), 1);
        system.clear();
        assert_eq!(system.active_count(), 0);
    }

    #[test]
    fn test_is_animating_until_tween_completes() {
        let (clock, mut system, mut targets) = setup();
        system.animate_scale("tree", 1.0, Duration::from_millis(100));
        assert!(system.is_animating(&"tree"));
        assert!(!system.is_animating(&"lamp"));

        system.update(&mut targets);
        clock.advance_ms(100);
        system.update(&mut targets);
        assert!(!system.is_animating(&"tree"));
    }
}
