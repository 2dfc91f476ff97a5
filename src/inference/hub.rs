use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use hf_hub::api::tokio::Api;
use hf_hub::{Repo, RepoType};

/// Local paths of everything needed to bring a model up.
pub struct ModelSnapshot {
    pub tokenizer: PathBuf,
    pub config: PathBuf,
    pub weights: Vec<PathBuf>,
}

/// Resolve a model identifier to local files, downloading through the hub
/// cache on first use. Large models ship sharded weights behind an index
/// file; small ones ship a single `model.safetensors`.
pub async fn fetch(model_id: &str, revision: &str) -> Result<ModelSnapshot> {
    let api = Api::new()?;
    let repo = api.repo(Repo::with_revision(
        model_id.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    let tokenizer = repo.get("tokenizer.json").await?;
    let config = repo.get("config.json").await?;

    let weights = match repo.get("model.safetensors.index.json").await {
        Ok(index_path) => {
            let index: serde_json::Value = serde_json::from_slice(&fs::read(&index_path)?)?;
            let mut files = Vec::new();
            for name in shard_names(&index)? {
                files.push(repo.get(&name).await?);
            }
            files
        }
        Err(_) => vec![repo.get("model.safetensors").await?],
    };

    println!("📦 Found {} weight file(s) for {model_id}", weights.len());

    Ok(ModelSnapshot {
        tokenizer,
        config,
        weights,
    })
}

/// Distinct shard file names from an index `weight_map`, in stable order.
/// The map lists one entry per tensor, so shard names repeat heavily.
fn shard_names(index: &serde_json::Value) -> Result<Vec<String>> {
    let weight_map = index["weight_map"]
        .as_object()
        .ok_or_else(|| anyhow!("index.json: weight_map is not an object"))?;

    let names = weight_map
        .values()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("index.json: invalid shard entry"))
        })
        .collect::<Result<BTreeSet<_>>>()?;

    Ok(names.into_iter().collect())
}
