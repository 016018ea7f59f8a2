/*
 * Holds the ordered, capacity-bounded list of markdown section files. The index
 * of a file is its rank: it decides both where it is displayed and where its
 * content lands in the assembled document.
 *
 * Every mutator is total. Indices that are out of range (typically captured
 * before another mutation shortened the list) turn the call into a no-op
 * instead of an error.
 */
use crate::core::file_descriptor::FileDescriptor;

pub const MAX_SECTION_FILES: usize = 20;

/*
 * Result of an `add` call. `overflow_count` only counts files that were turned
 * away for lack of room; duplicates are counted separately and never consume
 * a slot.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    pub accepted_count: usize,
    pub overflow_count: usize,
    pub duplicate_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SectionCollection {
    files: Vec<FileDescriptor>,
}

impl SectionCollection {
    pub fn new() -> Self {
        SectionCollection { files: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileDescriptor> {
        self.files.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileDescriptor> {
        self.files.iter()
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_SECTION_FILES.saturating_sub(self.files.len())
    }

    pub fn contains(&self, candidate: &FileDescriptor) -> bool {
        self.files.iter().any(|f| f.same_file(candidate))
    }

    /*
     * Appends the candidates accepted by `is_accepted`, in input order. A
     * candidate whose identity is already present (including one appended
     * earlier in the same call) is skipped. Once the collection is full the
     * remaining non-duplicate candidates are counted as overflow.
     */
    pub fn add<I, P>(&mut self, candidates: I, is_accepted: P) -> AddOutcome
    where
        I: IntoIterator<Item = FileDescriptor>,
        P: Fn(&FileDescriptor) -> bool,
    {
        let mut outcome = AddOutcome::default();
        for candidate in candidates.into_iter().filter(|c| is_accepted(c)) {
            if self.contains(&candidate) {
                log::trace!("SectionCollection: Skipping duplicate '{}'", candidate.name);
                outcome.duplicate_count += 1;
                continue;
            }
            if self.files.len() >= MAX_SECTION_FILES {
                outcome.overflow_count += 1;
                continue;
            }
            self.files.push(candidate);
            outcome.accepted_count += 1;
        }
        log::debug!(
            "SectionCollection: add -> {outcome:?}, now {} file(s)",
            self.files.len()
        );
        outcome
    }

    pub fn remove_at(&mut self, index: usize) -> Option<FileDescriptor> {
        if index >= self.files.len() {
            log::debug!(
                "SectionCollection: remove_at({index}) ignored, len is {}",
                self.files.len()
            );
            return None;
        }
        Some(self.files.remove(index))
    }

    // Returns true if the list changed.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.files.len() {
            return false;
        }
        self.files.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.files.len() {
            return false;
        }
        self.files.swap(index, index + 1);
        true
    }

    /*
     * Takes the element at `from_index` out and reinserts it so that it ends up
     * at `to_index`; the elements in between shift by one.
     */
    pub fn reorder(&mut self, from_index: usize, to_index: usize) -> bool {
        let len = self.files.len();
        if from_index == to_index || from_index >= len || to_index >= len {
            return false;
        }
        let moved = self.files.remove(from_index);
        self.files.insert(to_index, moved);
        log::debug!("SectionCollection: Moved rank {from_index} to {to_index}");
        true
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::collections::HashSet;

    fn md(name: &str) -> FileDescriptor {
        FileDescriptor::from_bytes(name, 1_700_000_000_000, name.as_bytes().to_vec())
    }

    fn names(collection: &SectionCollection) -> Vec<&str> {
        collection.iter().map(|f| f.name.as_str()).collect()
    }

    fn collection_of(items: &[&str]) -> SectionCollection {
        let mut collection = SectionCollection::new();
        collection.add(items.iter().map(|n| md(n)), |_| true);
        collection
    }

    #[test]
    fn test_add_25_distinct_files_caps_at_20() {
        // Arrange
        let mut collection = SectionCollection::new();
        let candidates: Vec<_> = (0..25).map(|i| md(&format!("s{i:02}.md"))).collect();

        // Act
        let outcome = collection.add(candidates, |_| true);

        // Assert
        assert_eq!(collection.len(), MAX_SECTION_FILES);
        assert_eq!(outcome.accepted_count, 20);
        assert_eq!(outcome.overflow_count, 5);
        assert_eq!(collection.get(0).unwrap().name, "s00.md");
        assert_eq!(collection.get(19).unwrap().name, "s19.md");
    }

    #[test]
    fn test_add_duplicate_leaves_length_unchanged() {
        let mut collection = collection_of(&["a.md", "b.md"]);

        let outcome = collection.add(vec![md("a.md")], |_| true);

        assert_eq!(collection.len(), 2);
        assert_eq!(outcome.accepted_count, 0);
        assert_eq!(outcome.duplicate_count, 1);
        assert_eq!(outcome.overflow_count, 0);
    }

    #[test]
    fn test_add_skips_duplicates_within_same_batch() {
        let mut collection = SectionCollection::new();
        let outcome = collection.add(vec![md("a.md"), md("a.md"), md("b.md")], |_| true);
        assert_eq!(names(&collection), vec!["a.md", "b.md"]);
        assert_eq!(outcome.duplicate_count, 1);
    }

    #[test]
    fn test_add_respects_predicate_and_input_order() {
        let mut collection = SectionCollection::new();
        let outcome = collection.add(
            vec![md("z.md"), md("skip.txt"), md("a.md")],
            |f| f.name.ends_with(".md"),
        );
        assert_eq!(names(&collection), vec!["z.md", "a.md"]);
        assert_eq!(outcome.accepted_count, 2);
    }

    #[test]
    fn test_duplicates_do_not_count_as_overflow_when_full() {
        let items: Vec<String> = (0..20).map(|i| format!("f{i}.md")).collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let mut collection = collection_of(&refs);

        let outcome = collection.add(vec![md("f3.md"), md("new.md")], |_| true);

        assert_eq!(outcome.duplicate_count, 1);
        assert_eq!(outcome.overflow_count, 1);
        assert_eq!(collection.len(), 20);
    }

    #[test]
    fn test_move_up_then_reorder() {
        let mut collection = collection_of(&["A", "B", "C", "D"]);

        assert!(collection.move_up(2));
        assert_eq!(names(&collection), vec!["A", "C", "B", "D"]);

        assert!(collection.reorder(0, 3));
        assert_eq!(names(&collection), vec!["C", "B", "D", "A"]);
    }

    #[test]
    fn test_move_boundaries_are_no_ops() {
        let mut collection = collection_of(&["A", "B", "C"]);
        assert!(!collection.move_up(0));
        assert!(!collection.move_down(2));
        assert!(!collection.move_down(7));
        assert!(!collection.move_up(9));
        assert_eq!(names(&collection), vec!["A", "B", "C"]);

        assert!(collection.move_down(0));
        assert_eq!(names(&collection), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_reorder_invalid_indices_are_no_ops() {
        let mut collection = collection_of(&["A", "B", "C"]);
        assert!(!collection.reorder(1, 1));
        assert!(!collection.reorder(3, 0));
        assert!(!collection.reorder(0, 3));
        assert_eq!(names(&collection), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_reorder_towards_front() {
        let mut collection = collection_of(&["A", "B", "C", "D"]);
        assert!(collection.reorder(3, 1));
        assert_eq!(names(&collection), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn test_remove_at_uses_current_rank_after_reorder() {
        let mut collection = collection_of(&["A", "B", "C"]);
        collection.reorder(0, 2);
        assert_eq!(names(&collection), vec!["B", "C", "A"]);

        let removed = collection.remove_at(0).unwrap();

        assert_eq!(removed.name, "B");
        assert_eq!(names(&collection), vec!["C", "A"]);
    }

    #[test]
    fn test_remove_at_stale_index_is_no_op() {
        let mut collection = collection_of(&["A", "B"]);
        collection.remove_at(1);
        assert!(collection.remove_at(1).is_none());
        assert_eq!(names(&collection), vec!["A"]);
    }

    #[test]
    fn test_clear_empties_collection() {
        let mut collection = collection_of(&["A", "B"]);
        collection.clear();
        assert!(collection.is_empty());
        assert_eq!(collection.remaining_capacity(), MAX_SECTION_FILES);
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let mut rng = rand::rng();
        let mut collection = SectionCollection::new();
        for _ in 0..2_000 {
            let len = collection.len();
            let idx = rng.random_range(0..=len + 1);
            match rng.random_range(0..6) {
                0 => {
                    let batch: Vec<_> = (0..rng.random_range(0..8))
                        .map(|_| md(&format!("r{}.md", rng.random_range(0..40))))
                        .collect();
                    collection.add(batch, |_| true);
                }
                1 => {
                    collection.remove_at(idx);
                }
                2 => {
                    collection.move_up(idx);
                }
                3 => {
                    collection.move_down(idx);
                }
                4 => {
                    let to = rng.random_range(0..=len + 1);
                    collection.reorder(idx, to);
                }
                _ => {
                    if rng.random_range(0..20) == 0 {
                        collection.clear();
                    }
                }
            }
            assert!(collection.len() <= MAX_SECTION_FILES);
            let identities: HashSet<_> = collection.iter().map(|f| f.identity()).collect();
            assert_eq!(identities.len(), collection.len(), "no duplicate identities");
        }
    }
}
