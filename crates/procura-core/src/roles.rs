use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::RawTable;

/// Label prefix reserved for internal bookkeeping columns. Such columns are
/// never eligible for role assignment.
pub const MARKER_PREFIX: &str = "__";

/// Semantic purpose a raw column can play in a supplier catalog.
///
/// Ordering doubles as the assignment priority: when a single label matches
/// several role keyword sets, the first role in this order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Item,
    Description,
    Specification,
    Unit,
    Price,
    Currency,
    Photo,
}

impl ColumnRole {
    pub const PRIORITY: [ColumnRole; 7] = [
        ColumnRole::Item,
        ColumnRole::Description,
        ColumnRole::Specification,
        ColumnRole::Unit,
        ColumnRole::Price,
        ColumnRole::Currency,
        ColumnRole::Photo,
    ];
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Item => write!(f, "item"),
            ColumnRole::Description => write!(f, "description"),
            ColumnRole::Specification => write!(f, "specification"),
            ColumnRole::Unit => write!(f, "unit"),
            ColumnRole::Price => write!(f, "price"),
            ColumnRole::Currency => write!(f, "currency"),
            ColumnRole::Photo => write!(f, "photo"),
        }
    }
}

/// Keyword sets used for role guessing, one per role.
#[derive(Debug, Clone)]
pub struct RoleKeywords {
    pub item: Vec<String>,
    pub description: Vec<String>,
    pub specification: Vec<String>,
    pub unit: Vec<String>,
    pub price: Vec<String>,
    pub currency: Vec<String>,
    pub photo: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for RoleKeywords {
    fn default() -> Self {
        RoleKeywords {
            item: words(&["item", "name", "product", "title", "sku", "code", "article"]),
            description: words(&["desc", "description", "details"]),
            specification: words(&["spec", "specification", "standard"]),
            unit: words(&["unit", "uom", "measure"]),
            price: words(&["price", "cost", "rate", "amount"]),
            currency: words(&["currency", "curr"]),
            photo: words(&["photo", "image", "picture", "pic"]),
        }
    }
}

impl RoleKeywords {
    pub fn for_role(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Item => &self.item,
            ColumnRole::Description => &self.description,
            ColumnRole::Specification => &self.specification,
            ColumnRole::Unit => &self.unit,
            ColumnRole::Price => &self.price,
            ColumnRole::Currency => &self.currency,
            ColumnRole::Photo => &self.photo,
        }
    }
}

/// Role -> column label assignments for one table. A role with no entry is
/// unresolved. Callers may override assignments before building items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnRoleMap {
    assignments: BTreeMap<ColumnRole, String>,
}

impl ColumnRoleMap {
    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        self.assignments.get(&role).map(String::as_str)
    }

    pub fn is_resolved(&self, role: ColumnRole) -> bool {
        self.assignments.contains_key(&role)
    }

    /// Manual override hook; replaces any guessed assignment for `role`.
    pub fn assign(&mut self, role: ColumnRole, label: impl Into<String>) {
        self.assignments.insert(role, label.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &str)> {
        self.assignments.iter().map(|(r, l)| (*r, l.as_str()))
    }

    fn column_is_taken(&self, label: &str) -> bool {
        self.assignments.values().any(|l| l == label)
    }
}

/// Lowercase and strip everything but letters and digits.
///
/// Shared between column-role guessing and fuzzy name matching so both see
/// the same token stream. Idempotent.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Guess which column plays which role, by token containment.
///
/// Columns are scanned in table order; each column claims the first role, in
/// priority order, that is still unresolved and whose keywords its
/// normalized label contains. A column claims at most one role, and later
/// columns can never take a role already claimed.
pub fn classify_columns(table: &RawTable, keywords: &RoleKeywords) -> ColumnRoleMap {
    let mut map = ColumnRoleMap::default();

    for label in &table.columns {
        if label.starts_with(MARKER_PREFIX) {
            continue;
        }
        if map.column_is_taken(label) {
            continue;
        }
        let normalized = normalize_key(label);
        if normalized.is_empty() {
            continue;
        }
        for role in ColumnRole::PRIORITY {
            if map.is_resolved(role) {
                continue;
            }
            if keywords
                .for_role(role)
                .iter()
                .any(|kw| normalized.contains(kw.as_str()))
            {
                map.assign(role, label.clone());
                break;
            }
        }
    }

    map
}
