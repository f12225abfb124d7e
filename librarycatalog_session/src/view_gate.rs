use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::role_policy::Capabilities;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ViewId {
    PublicCatalog,
    EditableCatalog,
    AdminUsers,
}

impl ViewId {
    pub const ALL: [ViewId; 3] = [
        ViewId::PublicCatalog,
        ViewId::EditableCatalog,
        ViewId::AdminUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::PublicCatalog => "publicCatalog",
            ViewId::EditableCatalog => "editableCatalog",
            ViewId::AdminUsers => "adminUsers",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown view {0}")]
pub struct UnknownView(pub String);

impl FromStr for ViewId {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewId::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

pub fn is_view_visible(capabilities: &Capabilities, view: ViewId) -> bool {
    match view {
        ViewId::PublicCatalog => true,
        ViewId::EditableCatalog => capabilities.has_employee_access,
        ViewId::AdminUsers => capabilities.has_manager_access,
    }
}

pub fn visible_views(capabilities: &Capabilities) -> Vec<ViewId> {
    ViewId::ALL
        .into_iter()
        .filter(|view| is_view_visible(capabilities, *view))
        .collect()
}
