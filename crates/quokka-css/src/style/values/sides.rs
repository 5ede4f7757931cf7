//! Per-edge values.

use serde::Serialize;

/// One value for each of the four physical box edges.
///
/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
/// "The margin, border, and padding can be broken down into top, right,
/// bottom, and left segments."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sides<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Clone> Sides<T> {
    /// The same value on every edge.
    #[must_use]
    pub fn uniform(value: T) -> Self {
        Self {
            top: value.clone(),
            right: value.clone(),
            bottom: value.clone(),
            left: value,
        }
    }

    /// [§ 8.3 'margin'](https://www.w3.org/TR/CSS2/box.html#propdef-margin)
    ///
    /// Expand a 1–4 value shorthand:
    /// "If there is only one component value, it applies to all sides. If there
    /// are two values, the top and bottom margins are set to the first value
    /// and the right and left margins are set to the second. If there are three
    /// values, the top is set to the first value, the left and right are set to
    /// the second, and the bottom is set to the third. If there are four values,
    /// they apply to the top, right, bottom, and left, respectively."
    ///
    /// Returns `None` for an empty list or more than four values.
    #[must_use]
    pub fn from_shorthand(values: &[T]) -> Option<Self> {
        let (top, right, bottom, left) = match values {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => return None,
        };
        Some(Self {
            top: top.clone(),
            right: right.clone(),
            bottom: bottom.clone(),
            left: left.clone(),
        })
    }
}

impl<T> Sides<T> {
    /// Apply `f` to every edge.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Sides<U> {
        Sides {
            top: f(&self.top),
            right: f(&self.right),
            bottom: f(&self.bottom),
            left: f(&self.left),
        }
    }

    /// Iterate top, right, bottom, left.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.top, &self.right, &self.bottom, &self.left].into_iter()
    }
}
