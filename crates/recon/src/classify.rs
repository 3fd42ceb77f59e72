use crate::model::{KeyPartition, SourceTable};

/// Partition the union of both tables' keys into matched / source1-only / source2-only.
pub fn classify(table1: &SourceTable, table2: &SourceTable) -> KeyPartition {
    let mut partition = KeyPartition::default();

    for key in table1.keys() {
        if table2.contains_key(key) {
            partition.matched.insert(key.clone());
        } else {
            partition.only_source1.insert(key.clone());
        }
    }

    partition.only_source2 = table2
        .keys()
        .filter(|k| !table1.contains_key(*k))
        .cloned()
        .collect();

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;

    fn table(keys: &[&str]) -> SourceTable {
        keys.iter()
            .map(|k| (k.to_string(), Record::Decoded(json!({}))))
            .collect()
    }

    #[test]
    fn splits_matched_and_orphans() {
        let t1 = table(&["A.1", "B.1", "C.2"]);
        let t2 = table(&["B.1", "C.3", "D.1"]);
        let p = classify(&t1, &t2);

        assert_eq!(p.matched.iter().collect::<Vec<_>>(), ["B.1"]);
        assert_eq!(p.only_source1.iter().collect::<Vec<_>>(), ["A.1", "C.2"]);
        assert_eq!(p.only_source2.iter().collect::<Vec<_>>(), ["C.3", "D.1"]);
    }

    #[test]
    fn versions_are_part_of_the_key() {
        let p = classify(&table(&["X.1"]), &table(&["X.2"]));
        assert!(p.matched.is_empty());
        assert_eq!(p.only_source1.len(), 1);
        assert_eq!(p.only_source2.len(), 1);
    }

    #[test]
    fn empty_tables() {
        let p = classify(&table(&[]), &table(&["A.1"]));
        assert!(p.matched.is_empty());
        assert!(p.only_source1.is_empty());
        assert_eq!(p.only_source2.len(), 1);
    }

    #[test]
    fn output_is_lexicographic() {
        let t = table(&["b.1", "a.10", "a.9", "B.1"]);
        let p = classify(&t, &t);
        assert_eq!(
            p.matched.iter().collect::<Vec<_>>(),
            ["B.1", "a.10", "a.9", "b.1"]
        );
    }
}
