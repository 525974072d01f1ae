//! Clip and player ids. Clips and players are never removed, so an id is the
//! dense index of its entry in the engine.

use serde::{Deserialize, Serialize};

macro_rules! dense_id {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
            pub struct $name(pub u32);

            impl $name {
                pub(crate) fn at(index: usize) -> Self {
                    $name(index as u32)
                }
            }
        )*
    };
}

dense_id!(
    /// A loaded clip.
    AnimId,
    /// A player bound to one clip.
    PlayerId,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_index() {
        assert_eq!(AnimId::at(3), AnimId(3));
        assert_ne!(PlayerId::at(0), PlayerId::at(1));
    }
}
