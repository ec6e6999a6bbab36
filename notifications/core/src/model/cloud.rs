use serde::{Deserialize, Serialize};

/// Cloud Controller space, denormalized into every delivery sent to its
/// members.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Space {
    pub guid: String,
    pub name: String,
    pub organization_guid: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Organization {
    pub guid: String,
    pub name: String,
}
