//! Action parsing: discrete action indices to car controls.

use crate::arena::CarControls;
use crate::gamestate::{GameState, Player};

pub trait ActionParser: Send {
    /// Number of discrete actions; fixed for the parser's lifetime.
    fn action_amount(&self) -> usize;

    /// Controls for action `index`, which is always below `action_amount()`.
    fn parse_action(&mut self, index: usize, player: &Player, state: &GameState) -> CarControls;

    /// Which actions are currently allowed, `action_amount()` entries long.
    fn action_mask(&self, _player: &Player, _state: &GameState) -> Vec<bool> {
        vec![true; self.action_amount()]
    }
}

/// The conventional discrete lookup table: ground driving plus aerial
/// control combinations.
#[derive(Clone, Debug)]
pub struct LookupActionParser {
    table: Vec<CarControls>,
    /// Mask boosting actions while the car has no boost
    pub mask_boost_without_boost: bool,
}

impl Default for LookupActionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupActionParser {
    pub fn new() -> Self {
        Self {
            table: Self::make_table(),
            mask_boost_without_boost: false,
        }
    }

    pub fn with_boost_masking(mut self, enabled: bool) -> Self {
        self.mask_boost_without_boost = enabled;
        self
    }

    pub fn table(&self) -> &[CarControls] {
        &self.table
    }

    fn make_table() -> Vec<CarControls> {
        let mut table = Vec::with_capacity(90);
        let axis = [-1.0f32, 0.0, 1.0];

        // Ground
        for &throttle in &axis {
            for &steer in &axis {
                for boost in [false, true] {
                    for handbrake in [false, true] {
                        if boost && throttle != 1.0 {
                            continue;
                        }
                        table.push(CarControls {
                            throttle: if boost { 1.0 } else { throttle },
                            steer,
                            pitch: 0.0,
                            yaw: steer,
                            roll: 0.0,
                            jump: false,
                            boost,
                            handbrake,
                        });
                    }
                }
            }
        }

        // Aerial
        for &pitch in &axis {
            for &yaw in &axis {
                for &roll in &axis {
                    for jump in [false, true] {
                        for boost in [false, true] {
                            if jump && yaw != 0.0 {
                                continue;
                            }
                            if pitch == 0.0 && roll == 0.0 && !jump {
                                continue;
                            }
                            let handbrake = jump && (pitch != 0.0 || yaw != 0.0 || roll != 0.0);
                            table.push(CarControls {
                                throttle: if boost { 1.0 } else { 0.0 },
                                steer: yaw,
                                pitch,
                                yaw,
                                roll,
                                jump,
                                boost,
                                handbrake,
                            });
                        }
                    }
                }
            }
        }

        table
    }
}

impl ActionParser for LookupActionParser {
    fn action_amount(&self) -> usize {
        self.table.len()
    }

    fn parse_action(&mut self, index: usize, _player: &Player, _state: &GameState) -> CarControls {
        self.table[index]
    }

    fn action_mask(&self, player: &Player, _state: &GameState) -> Vec<bool> {
        if self.mask_boost_without_boost && player.car.boost <= 0.0 {
            self.table.iter().map(|c| !c.boost).collect()
        } else {
            vec![true; self.table.len()]
        }
    }
}
