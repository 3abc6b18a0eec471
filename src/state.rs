//! Contracts between the history tree and the simulated world
//!
//! The tree is generic over the world state it records; these two traits
//! are the entire surface a simulation must provide. [`WorldState`]
//! exposes the simulated clock that time-indexed queries search over, and
//! [`Step`] produces each successor state. Any `Fn(&S) -> S` closure or
//! function item is a [`Step`] for free.

/// A recorded state of the simulated world.
///
/// The clock must be non-decreasing along any root-to-leaf line of the
/// tree; queries by simulated time rely on that monotonicity.
pub trait WorldState {
    /// The simulated time at which this state holds.
    fn clock(&self) -> f64;
}

/// Produces the successor of a state.
pub trait Step<S: WorldState> {
    /// Compute the next state from `state`.
    fn step(&self, state: &S) -> S;
}

impl<S: WorldState, F: Fn(&S) -> S> Step<S> for F {
    fn step(&self, state: &S) -> S {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Tick(f64);

    impl WorldState for Tick {
        fn clock(&self) -> f64 {
            self.0
        }
    }

    fn advance(s: &Tick) -> Tick {
        Tick(s.0 + 1.0)
    }

    // Closures and fn items both satisfy Step through the blanket impl.
    fn take_stepper<S: WorldState, F: Step<S>>(stepper: F, state: &S) -> S {
        stepper.step(state)
    }

    #[test]
    fn fn_items_and_closures_are_steppers() {
        let from_fn = take_stepper(advance, &Tick(1.0));
        assert_eq!(from_fn.clock(), 2.0);

        let doubled = take_stepper(|s: &Tick| Tick(s.0 * 2.0), &Tick(3.0));
        assert_eq!(doubled.clock(), 6.0);
    }
}
