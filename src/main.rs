use burn::backend::{Wgpu, wgpu::WgpuDevice};
use tracing::{Level, info};
use wordcorpus::{Corpus, CorpusConfig, CorpusError, EncodedSplit};

const DEFAULT_DIR: &str = "data";

fn summarize(name: &str, split: &EncodedSplit) {
    info!(split = name, shape = ?split.shape(), "split ready");
}

fn main() -> Result<(), CorpusError> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    type MyBackend = Wgpu;

    let device = WgpuDevice::default();

    let dir = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_DIR.to_string());
    let config = CorpusConfig::new();

    let corpus = Corpus::load(&dir, &config)?;
    info!(
        vocab_size = corpus.vocabulary.size(),
        total_count = corpus.vocabulary.total_count(),
        "vocabulary built"
    );

    summarize("train", &corpus.train);
    summarize("valid", &corpus.valid);
    summarize("test", &corpus.test);

    if let Some(train) = corpus.train.flat_tensor::<MyBackend>(&device) {
        println!("{train}");
    }

    Ok(())
}
