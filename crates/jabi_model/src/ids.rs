//! Opaque ID newtypes for model entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy` and `Hash`. IDs are created
//! by [`Arena::alloc`](crate::arena::Arena::alloc) and are only meaningful
//! inside the session that issued them.

use crate::arena::ArenaId;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// The canonical identity of an element within one resolution session.
    ///
    /// Two lookups of the same logical symbol always yield the same
    /// `ElementId`, whatever path led to it.
    ElementId
);

define_id!(
    /// A type declaration node in the batch's syntax trees, including
    /// anonymous enum-constant bodies.
    DeclId
);

define_id!(
    /// Index of a compilation unit within the batch.
    UnitId
);
