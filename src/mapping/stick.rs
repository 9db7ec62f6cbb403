//! Analog stick to 8-way pad
//!
//! The stick position is classified into a neutral sector (0) or one of
//! eight 45° compass sectors (1-8). Two mechanisms keep the output from
//! chattering:
//!
//! - a dual-threshold deadzone: the stick leaves neutral only beyond `hi`
//!   and returns to it only below `lo`;
//! - an angular hysteresis: while active, the current sector is widened by
//!   `h` degrees on both edges before a neighbour takes over.
//!
//! Angles are `atan2(y, x)` in degrees shifted by 180°, so sector 1 is
//! centered on the stick pushed left and numbering follows increasing
//! angle with Y growing downwards:
//!
//! ```text
//!        3 (Up)
//!     2     4
//!  1 (Left)   5 (Right)
//!     8     6
//!        7 (Down)
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::config::ConfigError;
use crate::input::{ControllerAxis, InputListener};
use crate::output::{OutputButton, OutputSink};

pub const DEFAULT_DEADZONE_LO: f32 = 0.4;
pub const DEFAULT_DEADZONE_HI: f32 = 0.5;
pub const DEFAULT_ANGLE_HYSTERESIS: f32 = 5.0;

/// Half the width of a sector; hysteresis must stay below it
const HALF_SECTOR: f32 = 22.5;

const MASK_UP: u8 = 0x01;
const MASK_RIGHT: u8 = 0x02;
const MASK_DOWN: u8 = 0x04;
const MASK_LEFT: u8 = 0x08;

const MASK_OUTPUTS: [(u8, OutputButton); 4] = [
    (MASK_LEFT, OutputButton::Left),
    (MASK_RIGHT, OutputButton::Right),
    (MASK_UP, OutputButton::Up),
    (MASK_DOWN, OutputButton::Down),
];

/// Which physical stick a mapper listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    fn axes(self) -> (ControllerAxis, ControllerAxis) {
        match self {
            Stick::Left => (ControllerAxis::LeftX, ControllerAxis::LeftY),
            Stick::Right => (ControllerAxis::RightX, ControllerAxis::RightY),
        }
    }
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stick::Left => "left",
            Stick::Right => "right",
        })
    }
}

impl FromStr for Stick {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Stick::Left),
            "R" => Ok(Stick::Right),
            _ => Err(ConfigError::UnknownName {
                kind: "stick",
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StickMapper {
    stick: Stick,
    deadzone_lo: f32,
    deadzone_hi: f32,
    angle_hysteresis: f32,
    x: f32,
    y: f32,
    sector: u8,
}

impl StickMapper {
    pub fn new(stick: Stick) -> Self {
        Self {
            stick,
            deadzone_lo: DEFAULT_DEADZONE_LO,
            deadzone_hi: DEFAULT_DEADZONE_HI,
            angle_hysteresis: DEFAULT_ANGLE_HYSTERESIS,
            x: 0.0,
            y: 0.0,
            sector: 0,
        }
    }

    /// Set deadzone thresholds; requires `0 <= lo < hi < 1`
    pub fn set_deadzone(&mut self, lo: f32, hi: f32) -> Result<(), ConfigError> {
        check_unit_interval("low deadzone", lo)?;
        check_unit_interval("high deadzone", hi)?;
        if lo >= hi {
            return Err(ConfigError::DeadzoneOrder { lo, hi });
        }

        self.deadzone_lo = lo;
        self.deadzone_hi = hi;
        Ok(())
    }

    /// Set the angular hysteresis in degrees; requires `0 <= delta < 22.5`
    pub fn set_angle_hysteresis(&mut self, delta: f32) -> Result<(), ConfigError> {
        if !(0.0..HALF_SECTOR).contains(&delta) {
            return Err(ConfigError::OutOfRange {
                what: "angle hysteresis",
                value: delta,
                bound: ">= 0 and < 22.5",
            });
        }

        self.angle_hysteresis = delta;
        Ok(())
    }

    /// Current sector: 0 is neutral, 1-8 are compass sectors
    pub fn sector(&self) -> u8 {
        self.sector
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    fn next_sector(&self) -> u8 {
        let dist = self.x * self.x + self.y * self.y;
        let angle = stick_angle(self.x, self.y);

        if self.sector == 0 {
            if dist >= self.deadzone_hi * self.deadzone_hi {
                let sector = sector_for_angle(angle);
                debug!("{} stick out of deadzone in sector {}", self.stick, sector);
                return sector;
            }
            return 0;
        }

        if dist <= self.deadzone_lo * self.deadzone_lo {
            debug!("{} stick in deadzone", self.stick);
            return 0;
        }

        if sector_contains(self.sector, angle, self.angle_hysteresis) {
            return self.sector;
        }

        let sector = sector_for_angle(angle);
        debug!("{} stick now in sector {} (angle={:.2})", self.stick, sector, angle);
        sector
    }
}

impl InputListener for StickMapper {
    fn describe(&self) -> String {
        format!(
            "{} stick mapping; lo={:.2}, hi={:.2}, ht={:.2}",
            self.stick, self.deadzone_lo, self.deadzone_hi, self.angle_hysteresis
        )
    }

    fn on_axis_motion(&mut self, sink: &mut dyn OutputSink, axis: ControllerAxis, value: f32) {
        let (x_axis, y_axis) = self.stick.axes();
        if axis == x_axis {
            self.x = value;
        } else if axis == y_axis {
            self.y = value;
        } else {
            return;
        }

        trace!("{} stick: {:.2}/{:.2}", self.stick, self.x, self.y);

        let sector = self.next_sector();
        let prev_mask = sector_mask(self.sector);
        self.sector = sector;
        let curr_mask = sector_mask(sector);

        let diff = prev_mask ^ curr_mask;
        for (bit, button) in MASK_OUTPUTS {
            if diff & bit != 0 {
                sink.set_button_state(button, curr_mask & bit != 0);
            }
        }
    }
}

fn check_unit_interval(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..1.0).contains(&value) {
        return Err(ConfigError::OutOfRange {
            what,
            value,
            bound: ">= 0 and < 1",
        });
    }
    Ok(())
}

/// Stick angle in degrees, in `[0, 360]`, with 0 pointing left
pub fn stick_angle(x: f32, y: f32) -> f32 {
    y.atan2(x).to_degrees() + 180.0
}

/// Sector (1-8) whose 45° band contains `angle`
pub fn sector_for_angle(angle: f32) -> u8 {
    (((angle + HALF_SECTOR) / 45.0) as u32 % 8) as u8 + 1
}

/// Whether `angle` lies in `sector`'s band widened by `hysteresis` on both sides
pub fn sector_contains(sector: u8, angle: f32, hysteresis: f32) -> bool {
    if sector == 1 {
        return angle >= 360.0 - HALF_SECTOR - hysteresis || angle <= HALF_SECTOR + hysteresis;
    }

    let center = f32::from(sector - 1) * 45.0;
    angle >= center - HALF_SECTOR - hysteresis && angle <= center + HALF_SECTOR + hysteresis
}

fn sector_mask(sector: u8) -> u8 {
    match sector {
        1 => MASK_LEFT,
        2 => MASK_LEFT | MASK_UP,
        3 => MASK_UP,
        4 => MASK_UP | MASK_RIGHT,
        5 => MASK_RIGHT,
        6 => MASK_RIGHT | MASK_DOWN,
        7 => MASK_DOWN,
        8 => MASK_DOWN | MASK_LEFT,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordingSink;
    use proptest::prelude::*;

    fn mapper(lo: f32, hi: f32, ht: f32) -> StickMapper {
        let mut map = StickMapper::new(Stick::Left);
        map.set_deadzone(lo, hi).unwrap();
        map.set_angle_hysteresis(ht).unwrap();
        map
    }

    fn move_to(map: &mut StickMapper, sink: &mut RecordingSink, x: f32, y: f32) {
        map.on_axis_motion(sink, ControllerAxis::LeftX, x);
        map.on_axis_motion(sink, ControllerAxis::LeftY, y);
    }

    fn polar(radius: f32, angle_deg: f32) -> (f32, f32) {
        // Inverse of stick_angle
        let rad = (angle_deg - 180.0).to_radians();
        (radius * rad.cos(), radius * rad.sin())
    }

    #[test]
    fn test_sector_numbering() {
        assert_eq!(sector_for_angle(stick_angle(-1.0, 0.0)), 1);
        assert_eq!(sector_for_angle(stick_angle(0.0, -1.0)), 3);
        assert_eq!(sector_for_angle(stick_angle(1.0, 0.0)), 5);
        assert_eq!(sector_for_angle(stick_angle(0.0, 1.0)), 7);
        assert_eq!(sector_for_angle(stick_angle(-0.7, -0.7)), 2);
        assert_eq!(sector_for_angle(stick_angle(-0.7, 0.7)), 8);
    }

    #[test]
    fn test_sector_band_edges() {
        assert_eq!(sector_for_angle(0.0), 1);
        assert_eq!(sector_for_angle(22.4), 1);
        assert_eq!(sector_for_angle(22.5), 2);
        assert_eq!(sector_for_angle(337.4), 8);
        assert_eq!(sector_for_angle(337.5), 1);
        assert_eq!(sector_for_angle(360.0), 1);
    }

    #[test]
    fn test_push_right_presses_right() {
        let mut map = mapper(0.4, 0.5, 5.0);
        let mut sink = RecordingSink::new();

        move_to(&mut map, &mut sink, 0.0, 0.0);
        assert!(sink.events().is_empty());

        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, 0.6);
        assert_eq!(map.sector(), 5);
        assert_eq!(sink.events(), &[(OutputButton::Right, true)]);
    }

    #[test]
    fn test_push_left_presses_left() {
        let mut map = mapper(0.4, 0.5, 5.0);
        let mut sink = RecordingSink::new();

        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, -0.6);
        assert_eq!(map.sector(), 1);
        assert_eq!(sink.events(), &[(OutputButton::Left, true)]);
    }

    #[test]
    fn test_deadzone_exit_requires_high_threshold() {
        let mut map = mapper(0.4, 0.5, 5.0);
        let mut sink = RecordingSink::new();

        // Between lo and hi: still neutral
        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, 0.45);
        assert_eq!(map.sector(), 0);
        assert!(sink.events().is_empty());

        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, 0.55);
        assert_eq!(map.sector(), 5);

        // Back between lo and hi: still active
        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, 0.45);
        assert_eq!(map.sector(), 5);

        map.on_axis_motion(&mut sink, ControllerAxis::LeftX, 0.35);
        assert_eq!(map.sector(), 0);
        assert_eq!(
            sink.events(),
            &[(OutputButton::Right, true), (OutputButton::Right, false)]
        );
    }

    #[test]
    fn test_hysteresis_holds_sector_near_boundary() {
        let mut map = mapper(0.4, 0.5, 5.0);
        let mut sink = RecordingSink::new();

        // Sector 5 spans [157.5, 202.5); enter at its center
        let (x, y) = polar(0.9, 180.0);
        move_to(&mut map, &mut sink, x, y);
        assert_eq!(map.sector(), 5);
        sink.drain();

        // 205° is past the raw edge but within the 5° band
        for angle in [200.0, 205.0, 201.0, 206.0, 198.0] {
            let (x, y) = polar(0.9, angle);
            move_to(&mut map, &mut sink, x, y);
        }
        assert_eq!(map.sector(), 5);
        assert!(sink.events().is_empty());

        // 210° leaves the widened band and snaps to sector 6
        let (x, y) = polar(0.9, 210.0);
        move_to(&mut map, &mut sink, x, y);
        assert_eq!(map.sector(), 6);
        assert_eq!(sink.events(), &[(OutputButton::Down, true)]);
    }

    #[test]
    fn test_sector_one_wraps_around_zero() {
        assert!(sector_contains(1, 359.0, 0.0));
        assert!(sector_contains(1, 0.0, 0.0));
        assert!(sector_contains(1, 25.0, 5.0));
        assert!(!sector_contains(1, 28.0, 5.0));
        assert!(sector_contains(1, 334.0, 5.0));
        assert!(!sector_contains(1, 331.0, 5.0));
    }

    #[test]
    fn test_direct_jump_emits_mask_difference() {
        let mut map = mapper(0.4, 0.5, 0.0);
        let mut sink = RecordingSink::new();

        // Sector 2 (Left+Up) -> sector 4 (Up+Right) without passing neutral
        let (x, y) = polar(0.9, 45.0);
        move_to(&mut map, &mut sink, x, y);
        assert_eq!(map.sector(), 2);
        sink.drain();

        let (x, y) = polar(0.9, 135.0);
        move_to(&mut map, &mut sink, x, y);
        assert_eq!(map.sector(), 4);
        assert_eq!(
            sink.events(),
            &[(OutputButton::Left, false), (OutputButton::Right, true)]
        );
    }

    #[test]
    fn test_other_stick_axes_are_ignored() {
        let mut map = mapper(0.4, 0.5, 5.0);
        let mut sink = RecordingSink::new();

        map.on_axis_motion(&mut sink, ControllerAxis::RightX, 1.0);
        map.on_axis_motion(&mut sink, ControllerAxis::LeftTrigger, 1.0);
        assert_eq!(map.position(), (0.0, 0.0));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_right_stick_mapper() {
        let mut map = StickMapper::new(Stick::Right);
        let mut sink = RecordingSink::new();

        map.on_axis_motion(&mut sink, ControllerAxis::LeftY, 1.0);
        assert!(sink.events().is_empty());
        map.on_axis_motion(&mut sink, ControllerAxis::RightY, 1.0);
        assert_eq!(sink.events(), &[(OutputButton::Down, true)]);
    }

    #[test]
    fn test_configuration_bounds() {
        let mut map = StickMapper::new(Stick::Left);
        assert!(map.set_deadzone(-0.1, 0.5).is_err());
        assert!(map.set_deadzone(0.2, 1.0).is_err());
        assert_eq!(
            map.set_deadzone(0.5, 0.5),
            Err(ConfigError::DeadzoneOrder { lo: 0.5, hi: 0.5 })
        );
        assert!(map.set_deadzone(0.0, 0.1).is_ok());

        assert!(map.set_angle_hysteresis(-1.0).is_err());
        assert!(map.set_angle_hysteresis(22.5).is_err());
        assert!(map.set_angle_hysteresis(22.4).is_ok());
        assert!(map.set_angle_hysteresis(0.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_outputs_match_sector_mask(
            moves in prop::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0), 1..60)
        ) {
            let mut map = mapper(0.4, 0.5, 5.0);
            let mut sink = RecordingSink::new();

            for (x, y) in moves {
                move_to(&mut map, &mut sink, x, y);

                let mask = sector_mask(map.sector());
                for (bit, button) in MASK_OUTPUTS {
                    let level = sink.levels().iter().any(|&(b, on)| b == button && on);
                    prop_assert_eq!(level, mask & bit != 0);
                }
                prop_assert!(mask.count_ones() <= 2);
            }
        }

        #[test]
        fn prop_edges_alternate_per_button(
            moves in prop::collection::vec((-1.0f32..=1.0, -1.0f32..=1.0), 1..60)
        ) {
            let mut map = mapper(0.3, 0.6, 10.0);
            let mut sink = RecordingSink::new();
            for (x, y) in moves {
                move_to(&mut map, &mut sink, x, y);
            }

            for (_, button) in MASK_OUTPUTS {
                let edges: Vec<bool> = sink
                    .events()
                    .iter()
                    .filter(|(b, _)| *b == button)
                    .map(|&(_, on)| on)
                    .collect();
                for (i, on) in edges.iter().enumerate() {
                    prop_assert_eq!(*on, i % 2 == 0);
                }
            }
        }

        #[test]
        fn prop_jitter_inside_band_is_silent(
            jitter in prop::collection::vec(-4.9f32..4.9, 1..40),
            sector in 1u8..=8,
        ) {
            let mut map = mapper(0.4, 0.5, 5.0);
            let mut sink = RecordingSink::new();

            let center = f32::from(sector - 1) * 45.0;
            let (x, y) = polar(0.9, center);
            move_to(&mut map, &mut sink, x, y);
            prop_assert_eq!(map.sector(), sector);
            sink.drain();

            // Jitter around the upper edge of the sector
            for delta in jitter {
                let (x, y) = polar(0.9, center + 22.5 + delta);
                move_to(&mut map, &mut sink, x, y);
            }
            prop_assert_eq!(map.sector(), sector);
            prop_assert!(sink.events().is_empty());
        }
    }
}
