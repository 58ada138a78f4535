//! Async definition enrichment against dictionaryapi.dev.
//!
//! One task per missing term, results joined and written last-write-wins.
//! Enrichment never gates drilling: a failed fetch just leaves the
//! definition empty for a later retry.

use anyhow::Result;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::Value;

use lexdrill_core::Vocabulary;
use lexdrill_core::time::{now_unix_ms, unix_ms_to_iso8601};
use lexdrill_store::Store;

const API_BASE: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// The slice of a dictionaryapi.dev entry we care about. A successful
/// lookup is an array of these; "not found" is an object and fails to
/// deserialize, which reads as "no definition".
#[derive(Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Deserialize)]
struct Meaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<Definition>,
}

#[derive(Deserialize)]
struct Definition {
    definition: String,
}

/// Pull the first definition out of a dictionaryapi.dev response body.
/// Part of speech is kept as a prefix when present.
pub fn parse_definition(body: &Value) -> Option<String> {
    let entries: Vec<DictionaryEntry> = serde_json::from_value(body.clone()).ok()?;
    let meaning = entries.first()?.meanings.first()?;
    let definition = &meaning.definitions.first()?.definition;

    match &meaning.part_of_speech {
        Some(pos) => Some(format!("({pos}) {definition}")),
        None => Some(definition.to_string()),
    }
}

async fn fetch_definition(client: &reqwest::Client, term: &str) -> Option<String> {
    let url = format!("{API_BASE}/{term}");
    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("fetch failed for '{term}': {e}");
            return None;
        }
    };
    if !response.status().is_success() {
        tracing::debug!("no entry for '{term}' ({})", response.status());
        return None;
    }
    match response.json::<Value>().await {
        Ok(body) => parse_definition(&body),
        Err(e) => {
            tracing::warn!("bad response body for '{term}': {e}");
            None
        }
    }
}

/// Fetch definitions for every word that lacks one. Returns the number
/// of definitions filled in.
pub async fn enrich_missing(store: &Store, vocab: &mut Vocabulary) -> Result<usize> {
    let missing: Vec<String> = vocab
        .iter()
        .filter(|w| w.definition.is_none())
        .map(|w| w.term.clone())
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    // Check the cache first; only hit the network for unseen terms
    let mut resolved: Vec<(String, String)> = Vec::new();
    let mut to_fetch: Vec<String> = Vec::new();
    for term in missing {
        match store
            .get_enrichment(&term)
            .map_err(|e| anyhow::anyhow!("enrichment cache read failed: {e}"))?
        {
            Some(cached) => resolved.push((term, cached)),
            None => to_fetch.push(term),
        }
    }

    if !to_fetch.is_empty() {
        let client = reqwest::Client::new();
        let tasks = to_fetch.into_iter().map(|term| {
            let client = client.clone();
            tokio::spawn(async move {
                let def = fetch_definition(&client, &term).await;
                (term, def)
            })
        });

        let fetched_at = unix_ms_to_iso8601(now_unix_ms());
        for joined in join_all(tasks).await {
            let Ok((term, Some(definition))) = joined else {
                continue;
            };
            store
                .put_enrichment(&term, &definition, &fetched_at)
                .map_err(|e| anyhow::anyhow!("enrichment cache write failed: {e}"))?;
            resolved.push((term, definition));
        }
    }

    let mut filled = 0;
    for (term, definition) in resolved {
        for word in vocab.iter_mut() {
            if word.term == term && word.definition.is_none() {
                word.definition = Some(definition.clone());
                filled += 1;
            }
        }
    }

    if filled > 0 {
        store
            .save_words(vocab)
            .map_err(|e| anyhow::anyhow!("failed to save words: {e}"))?;
    }
    Ok(filled)
}
