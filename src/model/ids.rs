//! Strongly typed record identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_ids {
    ($($name:ident => $prefix:literal),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = "Unique identifier of a " $name " record."]
                #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
                #[serde(transparent)]
                pub struct [<$name Id>](Uuid);

                impl [<$name Id>] {
                    /// Generates a fresh random identifier.
                    pub fn new() -> Self {
                        Self(Uuid::new_v4())
                    }

                    pub fn as_uuid(&self) -> &Uuid {
                        &self.0
                    }
                }

                impl Default for [<$name Id>] {
                    fn default() -> Self {
                        Self::new()
                    }
                }

                impl From<Uuid> for [<$name Id>] {
                    fn from(uuid: Uuid) -> Self {
                        Self(uuid)
                    }
                }

                impl fmt::Display for [<$name Id>] {
                    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "{}_{}", $prefix, self.0.simple())
                    }
                }
            )*
        }
    };
}

define_ids! {
    Customer => "cus",
    Cart => "cart",
    Product => "prod",
    Stall => "stall",
    Order => "ord",
}
