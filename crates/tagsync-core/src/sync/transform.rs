//! Mapping source entries to the records applied on the target.

use crate::hub::PackageEntry;

/// One package membership to write to the target tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Source package id; diagnostics only, never used for matching
    pub package_id: i64,
    pub package_name: String,
    pub owner: String,
    pub blocked: bool,
}

impl NormalizedRecord {
    pub fn from_entry(entry: PackageEntry, override_owner: Option<&str>) -> Self {
        let owner = match override_owner {
            Some(owner) => owner.to_string(),
            None => entry.owner_name,
        };

        Self {
            package_id: entry.package_id,
            package_name: entry.package_name,
            owner,
            blocked: entry.blocked,
        }
    }
}

/// Normalize every entry, preserving order and count.
pub fn normalize(
    entries: Vec<PackageEntry>,
    override_owner: Option<&str>,
) -> Vec<NormalizedRecord> {
    entries
        .into_iter()
        .map(|entry| NormalizedRecord::from_entry(entry, override_owner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<PackageEntry> {
        vec![
            PackageEntry::new(1, "foo", "alice", false),
            PackageEntry::new(2, "bar", "bob", true),
        ]
    }

    #[test]
    fn keeps_source_owner_without_override() {
        let records = normalize(entries(), None);
        assert_eq!(records[0].owner, "alice");
        assert_eq!(records[1].owner, "bob");
    }

    #[test]
    fn override_replaces_every_owner() {
        let records = normalize(entries(), Some("carol"));
        assert!(records.iter().all(|r| r.owner == "carol"));
    }

    #[test]
    fn preserves_order_flags_and_ids() {
        let records = normalize(entries(), Some("carol"));
        assert_eq!(
            records,
            vec![
                NormalizedRecord {
                    package_id: 1,
                    package_name: "foo".to_string(),
                    owner: "carol".to_string(),
                    blocked: false,
                },
                NormalizedRecord {
                    package_id: 2,
                    package_name: "bar".to_string(),
                    owner: "carol".to_string(),
                    blocked: true,
                },
            ]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let mut source = entries();
        source.push(PackageEntry::new(1, "foo", "alice", false));

        let records = normalize(source, None);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], records[2]);
    }

    #[test]
    fn empty_listing_yields_no_records() {
        assert!(normalize(Vec::new(), Some("carol")).is_empty());
    }
}
