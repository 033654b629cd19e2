use std::collections::HashMap;

/// Word to id mapping built in first-seen order, with occurrence counts.
///
/// Ids are dense: a vocabulary of `size()` words uses exactly `0..size()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    word_to_id: HashMap<String, i32>,
    id_to_word: Vec<String>,
    frequency: HashMap<i32, usize>,
    total_count: usize,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one occurrence of `word` and returns its id.
    ///
    /// # Panics
    ///
    /// When a new word would need an id past `i32::MAX`.
    pub fn add_word(&mut self, word: &str) -> i32 {
        let id = match self.word_to_id.get(word) {
            Some(id) => *id,
            None => {
                let id = next_id(self.id_to_word.len());
                self.id_to_word.push(word.to_string());
                self.word_to_id.insert(word.to_string(), id);
                id
            }
        };

        *self.frequency.entry(id).or_insert(0) += 1;
        self.total_count += 1;

        id
    }

    pub fn size(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }

    pub fn id(&self, word: &str) -> Option<i32> {
        self.word_to_id.get(word).copied()
    }

    pub fn word(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.id_to_word.get(i))
            .map(String::as_str)
    }

    pub fn frequency(&self, id: i32) -> usize {
        self.frequency.get(&id).copied().unwrap_or(0)
    }

    /// Sum of all occurrences, repeats included.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Words in id order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.id_to_word.iter().map(String::as_str)
    }

    /// Maps ids back to words, skipping ids the vocabulary never assigned.
    pub fn decode(&self, ids: &[i32]) -> Vec<&str> {
        ids.iter().filter_map(|id| self.word(*id)).collect()
    }
}

/// Ids are `i32` to feed `TensorData` directly, so at most `i32::MAX + 1`
/// distinct words fit.
fn next_id(len: usize) -> i32 {
    match i32::try_from(len) {
        Ok(id) => id,
        Err(_) => panic!("vocabulary exceeds {} distinct words", i32::MAX as u64 + 1),
    }
}
