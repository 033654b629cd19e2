pub mod corpus;
pub mod tokenizing;
pub mod vocabulary;

pub use corpus::{Corpus, CorpusConfig, CorpusError, CorpusLoader, EncodedSplit, PaddedSequences};
pub use vocabulary::Vocabulary;
