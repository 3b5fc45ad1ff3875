// End-to-end fine-tuning runs on the CPU ndarray backend with a
// tiny model: 4 training examples, 2 validation examples,
// batch size 2. Checks the observable artifacts of a run —
// history records, checkpoint files, loadable weights — rather
// than model quality.

use std::path::Path;

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

use text_summarizer::application::train_use_case::TrainConfig;
use text_summarizer::data::dataset::SummaryDataset;
use text_summarizer::data::encode::SummaryEncoder;
use text_summarizer::domain::example::SummaryExample;
use text_summarizer::infra::checkpoint::CheckpointManager;
use text_summarizer::infra::history::{HistoryLogger, TrainingHistory};
use text_summarizer::infra::tokenizer_store::TokenizerStore;
use text_summarizer::ml::summarizer::SummarizerModel;
use text_summarizer::ml::trainer::run_training;

type TestBackend = Autodiff<NdArray>;
type TestInferBackend = NdArray;

fn train_examples() -> Vec<SummaryExample> {
    vec![
        SummaryExample::new("the cat sat on the mat all day long", "cat sat on mat"),
        SummaryExample::new("a dog ran across the park and barked", "dog ran and barked"),
        SummaryExample::new("the bird flew over the house at dawn", "bird flew at dawn"),
        SummaryExample::new("a fish swam in the cold river water", "fish swam in river"),
    ]
}

fn val_examples() -> Vec<SummaryExample> {
    vec![
        SummaryExample::new("the cat sat on the mat again", "cat sat again"),
        SummaryExample::new("a dog barked at the bird", "dog barked"),
    ]
}

fn tiny_config(tmp: &Path, epochs: usize) -> TrainConfig {
    TrainConfig {
        dataset:            "xsum".to_string(),
        data_dir:           "data".to_string(),
        checkpoint_dir:     tmp.join("models").to_string_lossy().into_owned(),
        results_dir:        tmp.join("results").to_string_lossy().into_owned(),
        train_size:         4,
        val_size:           2,
        batch_size:         2,
        epochs,
        lr:                 1e-3,
        seed:               42,
        max_source_len:     32,
        max_target_len:     24,
        d_model:            32,
        num_heads:          2,
        num_encoder_layers: 1,
        num_decoder_layers: 1,
        d_ff:               64,
        dropout:            0.0,
        vocab_size:         100,
    }
}

/// Run a full tiny fine-tuning pass and return its history.
fn run(tmp: &Path, epochs: usize) -> TrainingHistory {
    let cfg = tiny_config(tmp, epochs);

    let train = train_examples();
    let texts: Vec<String> = train
        .iter()
        .flat_map(|e| [e.text.clone(), e.summary.clone()])
        .collect();
    let tokenizer = TokenizerStore::new(&cfg.checkpoint_dir)
        .load_or_build(&texts, cfg.vocab_size)
        .unwrap();

    let encoder = SummaryEncoder::with_lengths(tokenizer.clone(), 16, 8).unwrap();
    let train_dataset = SummaryDataset::from_examples(&train, &encoder).unwrap();
    let val_dataset = SummaryDataset::from_examples(&val_examples(), &encoder).unwrap();

    let device = NdArrayDevice::default();
    let model_cfg = cfg.model_config(tokenizer.get_vocab_size(true), encoder.pad_id() as usize);
    let model = model_cfg.init::<TestBackend>(&device);

    let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
    let model = ckpt_manager.init_from_pretrained(model, &device).unwrap();
    let summarizer = SummarizerModel::new(model, tokenizer, device).unwrap();

    let history_log = HistoryLogger::new(&cfg.results_dir, &cfg.dataset).unwrap();
    let (_summarizer, history) = run_training(
        &cfg,
        summarizer,
        train_dataset,
        val_dataset,
        &ckpt_manager,
        &history_log,
    )
    .unwrap();
    history
}

#[test]
fn test_single_epoch_run_produces_one_checkpoint_and_one_record() {
    let tmp = tempfile::tempdir().unwrap();
    let history = run(tmp.path(), 1);

    assert_eq!(history.records.len(), 1);
    let record = &history.records[0];
    assert_eq!(record.epoch, 1);
    assert!(record.train_loss.is_finite());
    assert!(record.train_loss >= 0.0);

    // Exactly one checkpoint artifact, no stranded temp file.
    let models = tmp.path().join("models");
    assert!(models.join("xsum_epoch_1.mpk.gz").exists());
    assert!(!models.join("tmp-xsum_epoch_1.mpk.gz").exists());

    // One history document with one entry.
    let json = std::fs::read_to_string(tmp.path().join("results/xsum_history.json")).unwrap();
    let loaded: TrainingHistory = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.dataset, "xsum");
    assert_eq!(loaded.records.len(), 1);
}

#[test]
fn test_history_grows_one_record_and_artifact_per_epoch() {
    let tmp = tempfile::tempdir().unwrap();
    let history = run(tmp.path(), 2);

    let epochs: Vec<usize> = history.records.iter().map(|r| r.epoch).collect();
    assert_eq!(epochs, vec![1, 2]);

    let models = tmp.path().join("models");
    assert!(models.join("xsum_epoch_1.mpk.gz").exists());
    assert!(models.join("xsum_epoch_2.mpk.gz").exists());

    let ckpt_manager = CheckpointManager::new(models.to_string_lossy().into_owned());
    assert_eq!(ckpt_manager.latest_epoch("xsum").unwrap(), 2);
}

#[test]
fn test_saved_checkpoint_loads_and_generates() {
    let tmp = tempfile::tempdir().unwrap();
    run(tmp.path(), 1);

    let cfg = tiny_config(tmp.path(), 1);
    let tokenizer = TokenizerStore::new(&cfg.checkpoint_dir).load().unwrap();
    let pad_id = tokenizer.token_to_id("<pad>").unwrap() as usize;

    let device = NdArrayDevice::default();
    let mut model_cfg = cfg.model_config(tokenizer.get_vocab_size(true), pad_id);
    model_cfg.dropout = 0.0;
    let model = model_cfg.init::<TestInferBackend>(&device);

    let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
    let model = ckpt_manager.load_model(model, "xsum", 1, &device).unwrap();
    let summarizer = SummarizerModel::new(model, tokenizer, device).unwrap();

    // A freshly fine-tuned tiny model produces arbitrary text,
    // but generation must succeed and terminate.
    let summary = summarizer.generate_summary("the cat sat on the mat").unwrap();
    assert!(summary.len() < 1000);
}
