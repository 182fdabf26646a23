//! Batch pipeline over document records.
//!
//! Stage order is fixed:
//!
//! 1. validate every record (fail fast)
//! 2. exact dedup, when configured before scoring
//! 3. tokenize (executor, index-preserving)
//! 4. n-gram statistics, importance scores and language identification
//!    (executor, scatter/gather)
//! 5. MinHash signatures (executor), then single-threaded insertion into one
//!    [`SignatureIndex`], seal, and per-document queries
//! 6. merge `original ⊕ ngram ⊕ importance ⊕ signature ⊕ language`
//! 7. exact dedup, when configured after scoring
//!
//! The signature index and the dedup filter are built per run and dropped
//! at its end. Neither is ever shared with a worker.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use exact::{DedupPosition, ExactDedupFilter};
use language::LanguageIdentifier;
use ngram::NgramStats;
use serde_json::Value;
use signature::{SignatureError, SignatureIndex, field_name, minhash_signature};
use tokenize::{TokenSet, Tokenizer};
use tracing::{debug, info, warn};
use wordgram::ImportanceScorer;

use crate::PipelineError;
use crate::config::PipelineConfig;
use crate::document::{DocId, Document, validate_batch};
use crate::executor::{ParallelExecutor, gather};
use crate::merge::{Partial, ScoreRecord, merge};

/// A configured pipeline. Reusable across batches; every run starts from
/// fresh index and filter state.
#[derive(Debug)]
pub struct Pipeline {
    cfg: PipelineConfig,
    tokenizer: Tokenizer,
    scorer: Option<ImportanceScorer>,
    language: LanguageIdentifier,
    executor: ParallelExecutor,
}

impl Pipeline {
    /// `scorer` is only used when the importance stage is switched on.
    pub fn new(
        cfg: PipelineConfig,
        scorer: Option<ImportanceScorer>,
    ) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let tokenizer = Tokenizer::new(cfg.tokenize.clone())?;
        let language = LanguageIdentifier::new(&cfg.language)?;
        let executor = ParallelExecutor::new(cfg.execution)?;
        if cfg.stages.importance && scorer.is_none() {
            debug!("no importance models supplied; importance stage skipped");
        }
        Ok(Self {
            cfg,
            tokenizer,
            scorer,
            language,
            executor,
        })
    }

    /// Like [`Pipeline::new`], building the importance scorer from the
    /// `importance` section when it lists models or corpora.
    pub fn from_config(cfg: PipelineConfig) -> Result<Self, PipelineError> {
        let scorer = if cfg.stages.importance && cfg.importance.is_configured() {
            let tokenizer = Tokenizer::new(cfg.tokenize.clone())?;
            Some(ImportanceScorer::from_config(&cfg.importance, &tokenizer)?)
        } else {
            None
        };
        Self::new(cfg, scorer)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn scorer(&self) -> Option<&ImportanceScorer> {
        self.scorer.as_ref()
    }

    /// Run one closed batch. Returns every surviving record fully merged,
    /// or the first error; never a partial result set.
    pub fn run(&self, records: Vec<Value>) -> Result<Vec<ScoreRecord>, PipelineError> {
        let started = Instant::now();
        let input = records.len();

        let mut docs = validate_batch(records, &self.cfg.fields)?;
        info!(documents = docs.len(), "batch validated");

        if self.dedup_at(DedupPosition::BeforeScoring) {
            docs = self.exact_dedup(docs, |doc| doc.text.as_str())?;
        }

        let stage = Instant::now();
        let token_sets = self
            .executor
            .map(&docs, |_, doc| Ok(self.tokenizer.tokenize(&doc.text)))?;
        info!(
            documents = docs.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "tokenize stage complete"
        );

        let scores = self.score(&docs, &token_sets)?;
        let near_dupes = if self.cfg.stages.signature {
            self.near_duplicates(&docs, &token_sets)?
        } else {
            vec![Partial::new(); docs.len()]
        };

        let stage = Instant::now();
        let mut merged = Vec::with_capacity(docs.len());
        for ((doc, (ngram, importance, language)), signature) in
            docs.iter().zip(scores).zip(near_dupes)
        {
            let original = ScoreRecord::from_document(doc, &self.cfg.fields.text);
            let partials = [ngram, importance, signature, language];
            merged.push(merge(&original, &partials, self.cfg.merge)?);
        }
        debug!(
            records = merged.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "merge stage complete"
        );

        if self.dedup_at(DedupPosition::AfterScoring) {
            merged = self.exact_dedup(merged, |record| record.text.as_str())?;
        }

        info!(
            input,
            output = merged.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        Ok(merged)
    }

    /// Read a JSON array of records from `input`, run it, and write the
    /// merged records to `output` as pretty-printed UTF-8 JSON.
    pub fn run_file(&self, input: &Path, output: &Path) -> Result<usize, PipelineError> {
        let reader = BufReader::new(File::open(input)?);
        let value: Value = serde_json::from_reader(reader)?;
        let Value::Array(records) = value else {
            return Err(PipelineError::InvalidInput(format!(
                "{} must contain a JSON array of records",
                input.display()
            )));
        };

        let results = self.run(records)?;

        let mut writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(&mut writer, &results)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %output.display(), records = results.len(), "output written");
        Ok(results.len())
    }

    fn dedup_at(&self, position: DedupPosition) -> bool {
        self.cfg.exact_dedup.enabled && self.cfg.exact_dedup.position == position
    }

    /// Sequential, input-ordered pass over a fresh filter.
    fn exact_dedup<T, F>(&self, items: Vec<T>, key_fn: F) -> Result<Vec<T>, PipelineError>
    where
        F: Fn(&T) -> &str,
    {
        let mut filter = ExactDedupFilter::new(&self.cfg.exact_dedup)?;
        let (kept, _) = filter.filter(items, key_fn);
        Ok(kept)
    }

    /// N-gram, importance and language partials, one triple per document.
    fn score(
        &self,
        docs: &[Document],
        token_sets: &[TokenSet],
    ) -> Result<Vec<(Partial, Partial, Partial)>, PipelineError> {
        let stage = Instant::now();
        let ngram_cfg = self.cfg.stages.ngram.then_some(&self.cfg.ngram);
        let scorer = self.scorer.as_ref().filter(|_| self.cfg.stages.importance);
        let identifier = self.cfg.stages.language.then_some(&self.language);

        let tagged = self.executor.map_tagged(docs, |index, doc| {
            let tokens = &token_sets[index];
            let ngram = match ngram_cfg {
                Some(cfg) => NgramStats::compute(&doc.text, tokens, cfg)?.into_fields(),
                None => Partial::new(),
            };
            let importance = match scorer {
                Some(scorer) => scorer
                    .score_fields(&tokens.tokens)?
                    .into_iter()
                    .map(|(key, score)| (key, Value::from(score)))
                    .collect(),
                None => Partial::new(),
            };
            let language = match identifier {
                Some(identifier) => identifier.identify(&doc.text).into_fields(),
                None => Partial::new(),
            };
            Ok((ngram, importance, language))
        })?;

        info!(
            documents = docs.len(),
            ngram = ngram_cfg.is_some(),
            importance_models = scorer.map_or(0, |s| s.models().len()),
            language = identifier.is_some(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "scoring stage complete"
        );
        Ok(gather(tagged))
    }

    /// `signature_sim{t}` partials, one per document.
    ///
    /// A document without tokens is not indexed; it gets empty match lists
    /// and never appears in another document's matches.
    fn near_duplicates(
        &self,
        docs: &[Document],
        token_sets: &[TokenSet],
    ) -> Result<Vec<Partial>, PipelineError> {
        let stage = Instant::now();
        let sig_cfg = &self.cfg.signature;

        let signatures = self.executor.map(token_sets, |_, tokens| {
            match minhash_signature(&tokens.unique, sig_cfg) {
                Ok(signature) => Ok(Some(signature)),
                Err(SignatureError::EmptyTokenSet) => Ok(None),
                Err(err) => Err(err.into()),
            }
        })?;

        let mut index: SignatureIndex<DocId> = SignatureIndex::build(sig_cfg)?;
        let mut indexed = Vec::with_capacity(docs.len());
        for (doc, signature) in docs.iter().zip(signatures) {
            match signature {
                Some(signature) => {
                    index.insert(doc.id.clone(), signature)?;
                    indexed.push(true);
                }
                None => {
                    warn!(id = %doc.id, "document has no tokens; left out of the signature index");
                    indexed.push(false);
                }
            }
        }
        index.seal();

        let no_matches: Partial = index
            .thresholds()
            .map(|threshold| (field_name(threshold), Value::Array(Vec::new())))
            .collect();

        let partials = docs
            .iter()
            .zip(&indexed)
            .map(|(doc, &is_indexed)| -> Result<Partial, PipelineError> {
                if !is_indexed {
                    return Ok(no_matches.clone());
                }
                Ok(index
                    .query(&doc.id)?
                    .into_iter()
                    .map(|found| {
                        let ids = found.matches.iter().map(Value::from).collect();
                        (found.field_name(), Value::Array(ids))
                    })
                    .collect())
            })
            .collect::<Result<Vec<Partial>, PipelineError>>()?;

        info!(
            documents = docs.len(),
            indexed = index.len(),
            thresholds = sig_cfg.thresholds.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "signature stage complete"
        );
        Ok(partials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageToggles;
    use crate::executor::ExecutionStrategy;
    use ngram::EmptyPolicy;
    use serde_json::json;
    use wordgram::WordgramModel;

    fn sequential() -> PipelineConfig {
        PipelineConfig {
            execution: ExecutionStrategy::Sequential,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn every_record_gets_its_metrics() {
        let pipeline = Pipeline::new(sequential(), None).unwrap();
        let out = pipeline
            .run(vec![
                json!({"id": 1, "text": "我 爱 北京 天安门", "source": "web"}),
                json!({"id": 2, "text": "今天 天气 很好"}),
            ])
            .unwrap();
        assert_eq!(out.len(), 2);
        for record in &out {
            for key in [
                "word_count",
                "word_entropy",
                "chars_dupe_2grams",
                "signature_sim0.7",
                "signature_sim0.8",
                "signature_sim0.9",
                "language",
                "prop",
            ] {
                assert!(record.get(key).is_some(), "missing {key}");
            }
        }
        assert_eq!(out[0].get("source"), Some(&json!("web")));
        assert_eq!(out[0].get("id"), Some(&json!(1)));
    }

    #[test]
    fn stages_can_be_switched_off() {
        let cfg = PipelineConfig {
            stages: StageToggles {
                ngram: false,
                importance: false,
                signature: false,
                language: false,
            },
            ..sequential()
        };
        let out = Pipeline::new(cfg, None)
            .unwrap()
            .run(vec![json!({"id": "a", "text": "北京 故宫"})])
            .unwrap();
        let keys: Vec<&str> = out[0].keys().collect();
        assert_eq!(keys, vec!["text", "id"]);
    }

    #[test]
    fn empty_document_gets_empty_match_lists() {
        let pipeline = Pipeline::new(sequential(), None).unwrap();
        let out = pipeline
            .run(vec![
                json!({"id": 1, "text": "。。。"}),
                json!({"id": 2, "text": "北京 故宫"}),
                json!({"id": 3, "text": "北京 故宫"}),
            ])
            .unwrap();
        assert_eq!(out[0].get("signature_sim0.7"), Some(&json!([])));
        assert_eq!(out[1].get("signature_sim0.9"), Some(&json!([3])));
        assert_eq!(out[0].get("word_count"), Some(&json!(0)));
    }

    #[test]
    fn fail_policy_aborts_batch() {
        let mut cfg = sequential();
        cfg.ngram = cfg.ngram.with_empty_policy(EmptyPolicy::Fail);
        let pipeline = Pipeline::new(cfg, None).unwrap();
        let result = pipeline.run(vec![
            json!({"id": 1, "text": "北京 故宫"}),
            json!({"id": 2, "text": "！！"}),
        ]);
        assert!(matches!(
            result,
            Err(PipelineError::WorkerFailure { index: 1, .. })
        ));
    }

    #[test]
    fn importance_fields_come_from_scorer() {
        let corpus: Vec<String> = "我 爱 北京 天安门 我 爱 北京 故宫"
            .split(' ')
            .map(String::from)
            .collect();
        let scorer = ImportanceScorer::new(
            vec![WordgramModel::build("wiki(2-gram)", &corpus, 2)],
            EmptyPolicy::Zero,
        );
        let pipeline = Pipeline::new(sequential(), Some(scorer)).unwrap();
        let out = pipeline
            .run(vec![json!({"id": 1, "text": "我 爱 北京"})])
            .unwrap();
        let score = out[0]
            .get("importance_sample_with_wiki(2-gram)")
            .and_then(Value::as_f64)
            .unwrap();
        assert!(score < 0.0);
    }

    #[test]
    fn language_partial_merged_last() {
        let out = Pipeline::new(sequential(), None)
            .unwrap()
            .run(vec![
                json!({"id": 1, "text": "我 爱 北京 天安门"}),
                json!({"id": 2, "text": ""}),
            ])
            .unwrap();
        assert_eq!(out[0].get("language"), Some(&json!("cmn")));
        let prop = out[0].get("prop").and_then(Value::as_f64).unwrap();
        assert!((0.0..=1.0).contains(&prop));
        assert_eq!(out[1].get("language"), Some(&json!("und")));
        assert_eq!(out[1].get("prop"), Some(&json!(0.0)));
    }

    #[test]
    fn bad_language_config_rejected() {
        let mut cfg = sequential();
        cfg.language.allowlist = vec!["nope".into()];
        assert!(matches!(
            Pipeline::new(cfg, None),
            Err(PipelineError::Config(_))
        ));
    }
}
