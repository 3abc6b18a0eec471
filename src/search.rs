//! Monotonic boundary search with rounding policies
//!
//! Shared by the path's time-indexed queries: given a function that is
//! non-decreasing over an ordered sequence, find the adjacent boundary
//! pair around a target value and resolve it under a caller-chosen
//! rounding policy.
//!
//! The function is fallible so arena lookups can thread their errors
//! through the search instead of panicking mid-probe.

use crate::HistoryError;

/// How to resolve a query that lands between two recorded elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// The element strictly below the target. Fails at the low edge.
    Low,
    /// The element at or above the target. Fails past the high edge.
    High,
    /// Only an element whose value equals the target exactly.
    Exact,
    /// The raw boundary pair, sides possibly absent at a traversal edge.
    Both,
    /// Whichever present side is numerically nearer; ties go low.
    Closest,
}

/// Adjacent elements around a target value: `f(low) < value <= f(high)`.
/// A side is `None` when the target falls off that edge of the sequence.
pub type BoundaryPair<T> = (Option<T>, Option<T>);

/// Outcome of resolving a boundary pair under a [`Rounding`] policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<T> {
    /// A single element, for every policy except [`Rounding::Both`].
    Single(T),
    /// The unresolved pair, for [`Rounding::Both`].
    Pair(Option<T>, Option<T>),
}

impl<T: Copy> Resolved<T> {
    /// The single resolved element, if this outcome carries one.
    pub fn single(&self) -> Option<T> {
        match *self {
            Resolved::Single(x) => Some(x),
            Resolved::Pair(..) => None,
        }
    }

    /// The boundary pair form. A single element appears on both sides.
    pub fn pair(&self) -> BoundaryPair<T> {
        match *self {
            Resolved::Single(x) => (Some(x), Some(x)),
            Resolved::Pair(low, high) => (low, high),
        }
    }
}

/// Binary-search an ordered slice for the boundary pair around `value`.
///
/// `f` must be non-decreasing over `items`. Returns indices `(low, high)`
/// such that `f(items[low]) < value <= f(items[high])` and the two are
/// adjacent; a side is absent when `value` falls off that end.
pub fn boundary_in_slice<T, F>(
    items: &[T],
    f: &F,
    value: f64,
) -> Result<BoundaryPair<usize>, HistoryError>
where
    F: Fn(&T) -> Result<f64, HistoryError>,
{
    if items.is_empty() {
        return Ok((None, None));
    }
    if f(&items[0])? >= value {
        return Ok((None, Some(0)));
    }
    let last = items.len() - 1;
    if f(&items[last])? < value {
        return Ok((Some(last), None));
    }

    // Invariant: f(items[lo]) < value <= f(items[hi]).
    let mut lo = 0;
    let mut hi = last;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if f(&items[mid])? < value {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok((Some(lo), Some(hi)))
}

/// Resolve a boundary pair under `rounding`.
///
/// `Exact` fails with [`HistoryError::NoExactMatch`] when neither side
/// equals `value`; `Low`/`High` fail with [`HistoryError::OutOfTimespan`]
/// when their side is absent. `Closest` prefers the numerically nearer
/// side and breaks ties toward `low`.
pub fn resolve<T, F>(
    pair: BoundaryPair<T>,
    f: &F,
    value: f64,
    rounding: Rounding,
) -> Result<Resolved<T>, HistoryError>
where
    T: Copy,
    F: Fn(&T) -> Result<f64, HistoryError>,
{
    let (low, high) = pair;
    match rounding {
        Rounding::Both => Ok(Resolved::Pair(low, high)),
        Rounding::Low => low
            .map(Resolved::Single)
            .ok_or(HistoryError::OutOfTimespan { value }),
        Rounding::High => high
            .map(Resolved::Single)
            .ok_or(HistoryError::OutOfTimespan { value }),
        Rounding::Exact => {
            for side in [low, high].into_iter().flatten() {
                if f(&side)? == value {
                    return Ok(Resolved::Single(side));
                }
            }
            Err(HistoryError::NoExactMatch { value })
        }
        Rounding::Closest => match (low, high) {
            (Some(l), Some(h)) => {
                let low_distance = (f(&l)? - value).abs();
                let high_distance = (f(&h)? - value).abs();
                if low_distance <= high_distance {
                    Ok(Resolved::Single(l))
                } else {
                    Ok(Resolved::Single(h))
                }
            }
            (Some(l), None) => Ok(Resolved::Single(l)),
            (None, Some(h)) => Ok(Resolved::Single(h)),
            (None, None) => Err(HistoryError::OutOfTimespan { value }),
        },
    }
}
