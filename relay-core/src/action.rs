//! Discrete action spaces.
use std::fmt::Debug;

/// An action drawn from a finite discrete space of known cardinality.
///
/// Every action converts to and from an integer id in `[0, NUM_ACTIONS)`.
/// The id is the wire format shared with the agent: policy vectors are
/// indexed by it and training batches carry it as `i64`.
pub trait DiscreteAction: Clone + Debug + Send + 'static {
    /// Cardinality of the action space.
    const NUM_ACTIONS: usize;

    /// Returns the id of this action.
    fn to_id(&self) -> usize;

    /// Returns the action with the given id.
    ///
    /// Panics if `id` is out of range.
    fn from_id(id: usize) -> Self;
}

/// The four cardinal directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir4 {
    /// Up.
    Up,
    /// Down.
    Down,
    /// Left.
    Left,
    /// Right.
    Right,
}

impl DiscreteAction for Dir4 {
    const NUM_ACTIONS: usize = 4;

    fn to_id(&self) -> usize {
        match self {
            Dir4::Up => 0,
            Dir4::Down => 1,
            Dir4::Left => 2,
            Dir4::Right => 3,
        }
    }

    fn from_id(id: usize) -> Self {
        match id {
            0 => Dir4::Up,
            1 => Dir4::Down,
            2 => Dir4::Left,
            3 => Dir4::Right,
            _ => panic!("invalid action id: {}", id),
        }
    }
}

// Cartesian products of discrete spaces, encoded mixed-radix with the
// first element varying fastest.
macro_rules! impl_tuple_action {
    ($($t:ident : $i:tt),+) => {
        impl<$($t: DiscreteAction),+> DiscreteAction for ($($t,)+) {
            const NUM_ACTIONS: usize = 1 $(* $t::NUM_ACTIONS)+;

            fn to_id(&self) -> usize {
                let mut id = 0;
                let mut stride = 1;
                $(
                    id += self.$i.to_id() * stride;
                    stride *= $t::NUM_ACTIONS;
                )+
                let _ = stride;
                id
            }

            fn from_id(id: usize) -> Self {
                assert!(id < Self::NUM_ACTIONS, "invalid action id: {}", id);
                let mut rem = id;
                let action = ($(
                    {
                        let a = $t::from_id(rem % $t::NUM_ACTIONS);
                        rem /= $t::NUM_ACTIONS;
                        a
                    },
                )+);
                let _ = rem;
                action
            }
        }
    };
}

impl_tuple_action!(A: 0, B: 1);
impl_tuple_action!(A: 0, B: 1, C: 2);
