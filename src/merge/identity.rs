//! Builds a per-side identity map for the merge driver. A duplicate
//! identity within one side's version is a contract violation (I2 is the
//! checker's job, not the merge driver's) - rejected as a typed error
//! rather than silently overwritten.

use std::collections::HashMap;

use crate::core::ast::Entry;
use crate::error::ThaloError;

pub fn build_identity_map<'a>(side: &'static str, entries: &'a [Entry]) -> Result<HashMap<String, &'a Entry>, ThaloError> {
    let mut map = HashMap::new();
    for entry in entries {
        let id = entry.identity();
        if map.insert(id.clone(), entry).is_some() {
            return Err(ThaloError::DuplicateIdentity { side, identity: id });
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::extract;
    use crate::core::cst::parse;

    fn entries(source: &str) -> Vec<Entry> {
        let tree = parse(source);
        extract(&tree.root, source).entries
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let e = entries("2026-01-05T18:00Z create journal ^j1 \"A\"\n2026-01-06T18:00Z update journal ^j1 \"B\"\n");
        assert!(build_identity_map("ours", &e).is_err());
    }

    #[test]
    fn unique_identities_build_a_map() {
        let e = entries("2026-01-05T18:00Z create journal ^j1 \"A\"\n2026-01-06T18:00Z create journal ^j2 \"B\"\n");
        let map = build_identity_map("ours", &e).unwrap();
        assert_eq!(map.len(), 2);
    }
}
