//! Group identifiers and effective group sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the group every caller belongs to.
pub const ALL_GROUP: &str = "all";

/// Group entry that grants every configured group.
pub const WILDCARD_GROUP: &str = "*";

/// A normalized (lower-case) group name.
///
/// A group is both a permission scope and the top-level directory segment
/// under the file root that holds its files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupName(String);

impl GroupName {
    /// Normalizes a raw name into a group name.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The implicit group granted to everyone.
    pub fn all() -> Self {
        Self(ALL_GROUP.to_string())
    }

    /// Returns the group name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the implicit `all` group.
    pub fn is_all(&self) -> bool {
        self.0 == ALL_GROUP
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The ordered set of groups a request may read.
///
/// Never empty: `all` is always the last member. Other members keep the
/// order they were granted in, which is the order the site root lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSet {
    groups: Vec<GroupName>,
}

impl GroupSet {
    /// The group set of an anonymous caller: exactly `{all}`.
    pub fn anonymous() -> Self {
        Self {
            groups: vec![GroupName::all()],
        }
    }

    /// Builds a set from granted groups, de-duplicating and appending `all`.
    pub fn from_granted<I>(granted: I) -> Self
    where
        I: IntoIterator<Item = GroupName>,
    {
        let mut groups: Vec<GroupName> = Vec::new();
        for group in granted {
            if !group.is_all() && !groups.contains(&group) {
                groups.push(group);
            }
        }
        groups.push(GroupName::all());
        Self { groups }
    }

    /// Returns true if the set contains the given group.
    pub fn contains(&self, group: &GroupName) -> bool {
        self.groups.contains(group)
    }

    /// Iterates the groups in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupName> {
        self.groups.iter()
    }

    /// Number of groups, including `all`.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the set is exactly `{all}`.
    pub fn is_anonymous(&self) -> bool {
        self.groups.len() == 1 && self.groups[0].is_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name_is_normalized() {
        assert_eq!(GroupName::new(" Private "), GroupName::new("private"));
        assert_eq!(GroupName::new("ALL"), GroupName::all());
    }

    #[test]
    fn test_from_granted_appends_all_once() {
        let set = GroupSet::from_granted(vec![
            GroupName::new("solly"),
            GroupName::all(),
            GroupName::new("private"),
            GroupName::new("solly"),
        ]);

        let names: Vec<&str> = set.iter().map(GroupName::as_str).collect();
        assert_eq!(names, vec!["solly", "private", "all"]);
    }

    #[test]
    fn test_anonymous_is_exactly_all() {
        let set = GroupSet::anonymous();
        assert!(set.is_anonymous());
        assert!(set.contains(&GroupName::all()));
        assert_eq!(set.len(), 1);
    }
}
