use crate::math::{Point2d, Polyline};

/// Tracks a car's progress around the circuit.
///
/// The counter only ever grows, by at most one per update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LapProgress {
    checkpoints_passed: usize,
}

impl LapProgress {
    /// The total number of checkpoints passed since the start.
    pub fn checkpoints_passed(&self) -> usize {
        self.checkpoints_passed
    }

    /// The index of the next checkpoint the car must pass.
    /// Always 0 on a track without checkpoints.
    pub fn next_checkpoint(&self, num_checkpoints: usize) -> usize {
        self.checkpoints_passed.checked_rem(num_checkpoints).unwrap_or(0)
    }

    /// The number of complete laps. Always 0 on a track without checkpoints.
    pub fn laps_done(&self, num_checkpoints: usize) -> usize {
        self.checkpoints_passed.checked_div(num_checkpoints).unwrap_or(0)
    }

    /// Advances the counter if `centre` lies inside the next checkpoint.
    /// Returns `true` if a checkpoint was passed.
    pub fn update(&mut self, checkpoints: &[Polyline], centre: Point2d) -> bool {
        if checkpoints.is_empty() {
            return false;
        }
        let next = self.next_checkpoint(checkpoints.len());
        if checkpoints[next].contains(centre) {
            self.checkpoints_passed += 1;
            true
        } else {
            false
        }
    }
}
