//! Input Intent
//!
//! Discrete input events from the window layer are folded into an
//! [`InputFrame`] between ticks (last write wins). The tick consumes the
//! frame once: held keys persist, one-shot commands and the analog turn
//! impulse are cleared.
//!
//! Frames are recorded delta-compressed so a game can be replayed exactly.

use serde::{Deserialize, Serialize};

/// One input intent from the outside world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Turn counter-clockwise while held.
    TurnLeft(bool),
    /// Turn clockwise while held.
    TurnRight(bool),
    /// Analog turn impulse; positive turns clockwise.
    TurnImpulse(i32),
    /// Accelerate along the heading while held.
    Thrust(bool),
    /// Accelerate against the heading while held.
    Reverse(bool),
    /// Fire whenever the cooldown allows while held.
    Fire(bool),
    /// Acknowledge the current message, or restart after game over.
    Confirm,
    /// Abandon the game and start again from level zero.
    ResetToLevelZero,
}

/// Input state read by one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed flags:
    /// - Bit 0: turn left held
    /// - Bit 1: turn right held
    /// - Bit 2: thrust held
    /// - Bit 3: reverse held
    /// - Bit 4: fire held
    /// - Bit 5: confirm pressed since last tick
    /// - Bit 6: reset pressed since last tick
    pub flags: u8,

    /// Accumulated analog turn impulse since last tick.
    pub turn_impulse: i8,
}

impl InputFrame {
    /// Turn left flag bit
    pub const FLAG_TURN_LEFT: u8 = 0x01;
    /// Turn right flag bit
    pub const FLAG_TURN_RIGHT: u8 = 0x02;
    /// Thrust flag bit
    pub const FLAG_THRUST: u8 = 0x04;
    /// Reverse flag bit
    pub const FLAG_REVERSE: u8 = 0x08;
    /// Fire flag bit
    pub const FLAG_FIRE: u8 = 0x10;
    /// Confirm flag bit (one-shot)
    pub const FLAG_CONFIRM: u8 = 0x20;
    /// Reset flag bit (one-shot)
    pub const FLAG_RESET: u8 = 0x40;

    /// Bits that stay set until released.
    pub const HELD_MASK: u8 = 0x1F;

    /// Idle frame.
    pub const fn new() -> Self {
        Self {
            flags: 0,
            turn_impulse: 0,
        }
    }

    /// Fold an input event into this frame.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::TurnLeft(on) => self.set(Self::FLAG_TURN_LEFT, on),
            InputEvent::TurnRight(on) => self.set(Self::FLAG_TURN_RIGHT, on),
            InputEvent::Thrust(on) => self.set(Self::FLAG_THRUST, on),
            InputEvent::Reverse(on) => self.set(Self::FLAG_REVERSE, on),
            InputEvent::Fire(on) => self.set(Self::FLAG_FIRE, on),
            InputEvent::Confirm => self.set(Self::FLAG_CONFIRM, true),
            InputEvent::ResetToLevelZero => self.set(Self::FLAG_RESET, true),
            InputEvent::TurnImpulse(amount) => {
                let sum = i32::from(self.turn_impulse).saturating_add(amount);
                self.turn_impulse = sum.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
            }
        }
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.flags |= flag;
        } else {
            self.flags &= !flag;
        }
    }

    /// Check a flag.
    #[inline]
    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// Net held turn direction: -1 left, 1 right, 0 neither or both.
    #[inline]
    pub fn turn_direction(&self) -> i32 {
        i32::from(self.has(Self::FLAG_TURN_RIGHT)) - i32::from(self.has(Self::FLAG_TURN_LEFT))
    }

    /// Thrust held.
    #[inline]
    pub fn thrusting(&self) -> bool {
        self.has(Self::FLAG_THRUST)
    }

    /// Reverse held.
    #[inline]
    pub fn reversing(&self) -> bool {
        self.has(Self::FLAG_REVERSE)
    }

    /// Fire held.
    #[inline]
    pub fn firing(&self) -> bool {
        self.has(Self::FLAG_FIRE)
    }

    /// Confirm pressed.
    #[inline]
    pub fn confirm(&self) -> bool {
        self.has(Self::FLAG_CONFIRM)
    }

    /// Reset pressed.
    #[inline]
    pub fn reset(&self) -> bool {
        self.has(Self::FLAG_RESET)
    }

    /// Copy with one-shot state removed.
    #[inline]
    pub fn held_only(&self) -> Self {
        Self {
            flags: self.flags & Self::HELD_MASK,
            turn_impulse: 0,
        }
    }

    /// Return the frame for this tick and keep only held keys for the next.
    #[inline]
    pub fn consume(&mut self) -> Self {
        let frame = *self;
        *self = self.held_only();
        frame
    }
}

/// Frame that took effect at `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u64,
    /// The new input state
    pub frame: InputFrame,
}

impl InputDelta {
    /// Create new delta entry.
    pub fn new(tick: u64, frame: InputFrame) -> Self {
        Self { tick, frame }
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Input history of one game, stored only where the frame changed.
///
/// One-shot bits belong to the tick they were recorded on; lookups for later
/// ticks see only the held keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Number of ticks covered, starting at tick 0
    pub tick_count: u64,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Empty recording.
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record the frame consumed at `tick`.
    pub fn record(&mut self, tick: u64, frame: InputFrame) {
        self.tick_count = self.tick_count.max(tick + 1);

        // A one-shot must be stored even if the bits look unchanged
        if frame != self.last_frame || frame != frame.held_only() {
            self.deltas.push(InputDelta::new(tick, frame));
        }
        self.last_frame = frame.held_only();
    }

    /// Frame in effect at `tick`.
    pub fn get_input_at(&self, tick: u64) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            return InputFrame::new();
        }
        let delta = &self.deltas[idx - 1];
        if delta.tick == tick {
            delta.frame
        } else {
            delta.frame.held_only()
        }
    }

    /// All deltas.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Mark the last tick of the game.
    pub fn finalize(&mut self, end_tick: u64) {
        self.tick_count = end_tick + 1;
    }

    /// Iterate `(tick, frame)` over every covered tick.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u64,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u64, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick >= self.recording.tick_count {
            return None;
        }

        let mut frame = self.current_frame.held_only();
        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            frame = delta.frame;
            self.delta_idx += 1;
        }
        self.current_frame = frame;

        let result = (self.current_tick, frame);
        self.current_tick += 1;
        Some(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_held_and_release() {
        let mut frame = InputFrame::new();
        frame.apply(InputEvent::Thrust(true));
        frame.apply(InputEvent::Fire(true));
        assert!(frame.thrusting());
        assert!(frame.firing());

        frame.apply(InputEvent::Thrust(false));
        assert!(!frame.thrusting());
        assert!(frame.firing());
    }

    #[test]
    fn test_turn_direction() {
        let mut frame = InputFrame::new();
        assert_eq!(frame.turn_direction(), 0);
        frame.apply(InputEvent::TurnLeft(true));
        assert_eq!(frame.turn_direction(), -1);
        frame.apply(InputEvent::TurnRight(true));
        assert_eq!(frame.turn_direction(), 0);
        frame.apply(InputEvent::TurnLeft(false));
        assert_eq!(frame.turn_direction(), 1);
    }

    #[test]
    fn test_consume_clears_one_shots() {
        let mut frame = InputFrame::new();
        frame.apply(InputEvent::Fire(true));
        frame.apply(InputEvent::Confirm);
        frame.apply(InputEvent::TurnImpulse(5));

        let taken = frame.consume();
        assert!(taken.confirm());
        assert_eq!(taken.turn_impulse, 5);

        assert!(!frame.confirm());
        assert_eq!(frame.turn_impulse, 0);
        assert!(frame.firing());
    }

    #[test]
    fn test_turn_impulse_saturates() {
        let mut frame = InputFrame::new();
        frame.apply(InputEvent::TurnImpulse(100));
        frame.apply(InputEvent::TurnImpulse(100));
        assert_eq!(frame.turn_impulse, i8::MAX);
        frame.apply(InputEvent::TurnImpulse(i32::MIN));
        assert_eq!(frame.turn_impulse, i8::MIN);
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut rec = InputRecording::new();
        let mut thrust = InputFrame::new();
        thrust.apply(InputEvent::Thrust(true));

        rec.record(0, InputFrame::new());
        rec.record(1, thrust);
        rec.record(2, thrust);
        rec.record(3, thrust);
        rec.record(4, InputFrame::new());

        assert_eq!(rec.delta_count(), 2);
        assert_eq!(rec.get_input_at(0), InputFrame::new());
        assert_eq!(rec.get_input_at(2), thrust);
        assert_eq!(rec.get_input_at(4), InputFrame::new());
    }

    #[test]
    fn test_one_shot_belongs_to_its_tick() {
        let mut rec = InputRecording::new();
        let mut confirm = InputFrame::new();
        confirm.apply(InputEvent::Confirm);

        rec.record(5, confirm);
        rec.record(6, InputFrame::new());
        rec.record(7, confirm);

        assert!(rec.get_input_at(5).confirm());
        assert!(!rec.get_input_at(6).confirm());
        assert!(rec.get_input_at(7).confirm());
        assert_eq!(rec.delta_count(), 2);
    }

    #[test]
    fn test_replay_iterator() {
        let mut rec = InputRecording::new();
        let mut fire = InputFrame::new();
        fire.apply(InputEvent::Fire(true));
        let mut fire_confirm = fire;
        fire_confirm.apply(InputEvent::Confirm);

        rec.record(2, fire_confirm);
        rec.record(3, fire);
        rec.finalize(5);

        let frames: Vec<_> = rec.replay_iter().collect();
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0], (0, InputFrame::new()));
        assert_eq!(frames[2], (2, fire_confirm));
        assert_eq!(frames[3], (3, fire));
        assert_eq!(frames[5], (5, fire));

        for (tick, frame) in rec.replay_iter() {
            assert_eq!(frame, rec.get_input_at(tick), "tick {tick}");
        }
    }
}
