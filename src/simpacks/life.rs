//! Conway's Game of Life on a toroidal board
//!
//! The classic demo simpack: deterministic, cheap to step, and visibly
//! divergent after a fork when the board is perturbed. The clock advances
//! by 1 per generation.

use std::fmt;

use crate::WorldState;

/// One generation of a Life board plus its clock reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct LifeState {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    clock: f64,
}

impl LifeState {
    /// An all-dead board at clock 0.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
            clock: 0.0,
        }
    }

    /// A board seeded with a glider in the top-left corner.
    pub fn glider(width: usize, height: usize) -> Self {
        let mut state = Self::blank(width, height);
        for &(x, y) in &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
            state.set(x, y, true);
        }
        state
    }

    /// Board width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(x, y)`, wrapping toroidally.
    pub fn get(&self, x: isize, y: isize) -> bool {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.cells[x * self.height + y]
    }

    /// Set cell `(x, y)`, wrapping toroidally.
    pub fn set(&mut self, x: isize, y: isize, alive: bool) {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.cells[x * self.height + y] = alive;
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn neighbour_count(&self, x: isize, y: isize) -> u8 {
        let mut count = 0;
        for dx in [-1, 0, 1] {
            for dy in [-1, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.get(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    fn will_become(&self, x: isize, y: isize) -> bool {
        let n = self.neighbour_count(x, y);
        if self.get(x, y) {
            (2..=3).contains(&n)
        } else {
            n == 3
        }
    }
}

impl WorldState for LifeState {
    fn clock(&self) -> f64 {
        self.clock
    }
}

impl fmt::Display for LifeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..self.width as isize {
            for y in 0..self.height as isize {
                write!(f, "{}", if self.get(x, y) { '#' } else { ' ' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Steps a [`LifeState`] one generation. Usable directly as a
/// [`Step`](crate::Step) implementation.
pub fn step(state: &LifeState) -> LifeState {
    let mut next = LifeState::blank(state.width, state.height);
    for x in 0..state.width as isize {
        for y in 0..state.height as isize {
            next.set(x, y, state.will_become(x, y));
        }
    }
    next.clock = state.clock + 1.0;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blinker_oscillates_with_period_two() {
        let mut state = LifeState::blank(5, 5);
        for &(x, y) in &[(2, 1), (2, 2), (2, 3)] {
            state.set(x, y, true);
        }

        let once = step(&state);
        assert_eq!(once.clock(), 1.0);
        assert_eq!(once.population(), 3);
        assert!(once.get(1, 2) && once.get(2, 2) && once.get(3, 2));

        let twice = step(&once);
        for &(x, y) in &[(2, 1), (2, 2), (2, 3)] {
            assert!(twice.get(x, y));
        }
        assert_eq!(twice.clock(), 2.0);
    }

    #[test]
    fn glider_conserves_population_on_a_torus() {
        let mut state = LifeState::glider(8, 8);
        for _ in 0..32 {
            state = step(&state);
            assert_eq!(state.population(), 5);
        }
        assert_eq!(state.clock(), 32.0);
    }

    #[test]
    fn toroidal_wrapping_is_symmetric() {
        let mut state = LifeState::blank(4, 4);
        state.set(-1, -1, true);
        assert!(state.get(3, 3));
        assert_eq!(state.neighbour_count(0, 0), 1);
    }
}
