//! Sentence embedder backed by a Candle BERT encoder

use crate::model_config::{EmbedderConfig, ModelSource, PoolingStrategy};
use crate::scorer::Embedder;
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use logguard_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Model, Tokenizer, TruncationParams};

/// Encodes text into a single pooled (and optionally normalized) vector
pub struct SentenceEmbedder {
    name: String,
    tokenizer: Tokenizer,
    model: BertModel,
    device: Device,
    pooling: PoolingStrategy,
    normalize: bool,
    hidden_size: usize,
}

#[derive(Deserialize)]
struct EncoderDims {
    hidden_size: usize,
}

impl SentenceEmbedder {
    /// Resolve, download if needed, and load the encoder described by `config`
    pub fn load(config: &EmbedderConfig) -> Result<Self> {
        let model_dir = resolve_model_dir(&config.source)?;
        let mut tokenizer = load_tokenizer(&model_dir)?;
        limit_length(&mut tokenizer, config.max_length)?;

        let config_path = model_dir.join("config.json");
        let bert_config: BertConfig = parse_json_config(&config_path)?;
        let dims: EncoderDims = parse_json_config(&config_path)?;

        let device = get_device(&config.device)?;
        let vb = load_var_builder(&model_dir, &device)?;
        let model = load_bert_backbone(&vb, &bert_config)?;

        let name = match &config.source {
            ModelSource::HuggingFace { repo, .. } => repo.clone(),
            ModelSource::Local { path } => path.display().to_string(),
        };

        tracing::info!(
            "Loaded sentence embedder '{}' (dim {}, pooling='{}', normalize={})",
            name,
            dims.hidden_size,
            config.pooling.as_str(),
            config.normalize
        );

        Ok(Self {
            name,
            tokenizer,
            model,
            device,
            pooling: config.pooling,
            normalize: config.normalize,
            hidden_size: dims.hidden_size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn row_tensor(&self, values: &[u32], what: &str) -> Result<Tensor> {
        Tensor::new(values, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::scorer(format!("Failed to create {} tensor: {}", what, e)))
    }
}

impl Embedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::scorer(format!("Tokenization failed: {}", e)))?;

        let input_ids = self.row_tensor(encoding.get_ids(), "input ids")?;
        let token_type_ids = self.row_tensor(encoding.get_type_ids(), "token type ids")?;
        let mask = self.row_tensor(encoding.get_attention_mask(), "attention mask")?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&mask))
            .map_err(|e| Error::scorer(format!("Encoder forward pass failed: {}", e)))?;

        let pooled = match self.pooling {
            PoolingStrategy::Cls => hidden.i((0, 0, ..)),
            PoolingStrategy::Mean => masked_mean(&hidden, &mask),
        }
        .and_then(|t| t.to_vec1::<f32>())
        .map_err(|e| {
            Error::scorer(format!("{} pooling failed: {}", self.pooling.as_str(), e))
        })?;

        Ok(if self.normalize {
            l2_normalize(pooled)
        } else {
            pooled
        })
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.hidden_size)
    }
}

/// Mean of `hidden` `[1, seq, dim]` over positions where `mask` `[1, seq]` is set.
///
/// Returns a `[dim]` vector; an all-zero mask yields zeros.
pub fn masked_mean(hidden: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
    let weights = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let total = hidden.broadcast_mul(&weights)?.sum(1)?;
    let count = weights.sum(1)?.clamp(1e-9f32, f32::MAX)?;
    total.broadcast_div(&count)?.squeeze(0)
}

/// Scale to unit length; zero vectors are returned unchanged
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

fn resolve_model_dir(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::model(format!(
                    "Embedder path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
    }
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Fetching embedder from HuggingFace: {} @ {}", repo, revision);

    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| Error::model(format!("Failed to initialize HuggingFace API: {}", e)))?;
    let repo_obj = api.repo(hf_hub::Repo::with_revision(
        repo.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::model(format!("Failed to download config.json: {}", e)))?;

    repo_obj
        .get("model.safetensors")
        .map_err(|e| Error::model(format!("Failed to download model.safetensors: {}", e)))?;

    let found_tokenizer = ["tokenizer.json", "vocab.txt"].iter().any(|file| {
        match repo_obj.get(file) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("{} not available: {}", file, e);
                false
            }
        }
    });
    if !found_tokenizer {
        return Err(Error::model(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model("Invalid HuggingFace cache path"))?;

    tracing::info!("Embedder available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn get_device(device_str: &str) -> Result<Device> {
    match device_str.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::model(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::model(format!("Failed to initialize Metal: {}", e))),
        _ => Ok(Device::Cpu),
    }
}

fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::model(format!("Failed to read config {}: {}", config_path.display(), e))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::model(format!("Failed to parse config {}: {}", config_path.display(), e))
    })
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join("model.safetensors");
    if !weights_path.exists() {
        return Err(Error::model(format!(
            "model.safetensors not found in {}",
            model_dir.display()
        )));
    }

    // SAFETY: the weights file is memory-mapped read-only and not modified
    // while the embedder is alive.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::model(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

/// Sentence-transformers exports keep the encoder at the weight root;
/// checkpoints saved from a task model nest it under `bert.`.
fn load_bert_backbone(vb: &VarBuilder, config: &BertConfig) -> Result<BertModel> {
    let mut failures = Vec::new();

    for prefix in ["", "bert"] {
        let scoped = if prefix.is_empty() { vb.clone() } else { vb.pp(prefix) };
        match BertModel::load(scoped, config) {
            Ok(model) => return Ok(model),
            Err(e) => failures.push(format!("prefix '{}': {}", prefix, e)),
        }
    }

    Err(Error::model(format!(
        "No BERT encoder weights found ({})",
        failures.join("; ")
    )))
}

/// Truncate the content to `max_length` tokens including `[CLS]`/`[SEP]`,
/// so long inputs keep their closing `[SEP]`.
fn limit_length(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::model(format!("Failed to configure truncation: {}", e)))?;
    Ok(())
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json = model_dir.join("tokenizer.json");
    if tokenizer_json.exists() {
        tracing::debug!("Using {}", tokenizer_json.display());
        return Tokenizer::from_file(&tokenizer_json)
            .map_err(|e| Error::model(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab = model_dir.join("vocab.txt");
    if vocab.exists() {
        tracing::debug!("No tokenizer.json, assembling BERT tokenizer from {}", vocab.display());
        return bert_tokenizer_from_vocab(&vocab);
    }

    Err(Error::model(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}

/// Uncased BERT pipeline: normalizer, whitespace/punctuation split, WordPiece,
/// `[CLS] ... [SEP]` wrapping with ids taken from the vocabulary.
fn bert_tokenizer_from_vocab(vocab: &Path) -> Result<Tokenizer> {
    let model = WordPiece::from_file(&vocab.to_string_lossy())
        .unk_token("[UNK]".into())
        .build()
        .map_err(|e| Error::model(format!("Invalid vocabulary {}: {}", vocab.display(), e)))?;

    let special = |token: &str| {
        model
            .token_to_id(token)
            .map(|id| (token.to_string(), id))
            .ok_or_else(|| Error::model(format!("Vocabulary has no {} token", token)))
    };
    let cls = special("[CLS]")?;
    let sep = special("[SEP]")?;

    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_normalizer(Some(BertNormalizer::default()));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
    tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));
    Ok(tokenizer)
}
