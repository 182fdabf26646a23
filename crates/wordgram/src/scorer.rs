use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;

use ngram::EmptyPolicy;
use serde_json::Value;
use tokenize::Tokenizer;
use tracing::{debug, info};

use crate::config::{check_model_name, first_repeat, CorpusFile, ModelSpec, WordgramConfig};
use crate::model::WordgramModel;
use crate::WordgramError;

/// Record key prefix of importance scores.
pub const FIELD_PREFIX: &str = "importance_sample_with_";

/// Scores documents against a fixed set of reference models.
///
/// Read-only after construction, so one scorer is shared by reference
/// across every worker.
#[derive(Debug, Clone)]
pub struct ImportanceScorer {
    models: Vec<WordgramModel>,
    policy: EmptyPolicy,
}

impl ImportanceScorer {
    /// Wrap already-built models.
    pub fn new(models: Vec<WordgramModel>, policy: EmptyPolicy) -> Self {
        Self { models, policy }
    }

    /// Build from the configuration: persisted models when any are listed,
    /// otherwise the corpus files.
    pub fn from_config(cfg: &WordgramConfig, tokenizer: &Tokenizer) -> Result<Self, WordgramError> {
        cfg.validate()?;
        if !cfg.models.is_empty() {
            Self::from_models(&cfg.models, cfg.empty_policy)
        } else if !cfg.corpora.is_empty() {
            Self::from_corpus_files(&cfg.corpora, tokenizer, cfg)
        } else {
            Err(WordgramError::NoModels)
        }
    }

    /// Load persisted models. Corpus text is never read on this path.
    ///
    /// Names must be distinct: each one becomes an output key.
    pub fn from_models(specs: &[ModelSpec], policy: EmptyPolicy) -> Result<Self, WordgramError> {
        if specs.is_empty() {
            return Err(WordgramError::NoModels);
        }
        if let Some(name) = first_repeat(specs.iter().map(|s| &s.name)) {
            return Err(WordgramError::DuplicateName { name: name.clone() });
        }
        info!(count = specs.len(), "loading wordgram models");
        let models = specs
            .iter()
            .map(|spec| {
                let mut model = WordgramModel::load(&spec.model_path)?;
                debug!(
                    name = %spec.name,
                    path = %spec.model_path.display(),
                    order = model.order,
                    distinct = model.distinct(),
                    "loaded wordgram model"
                );
                model.name = spec.name.clone();
                Ok(model)
            })
            .collect::<Result<Vec<_>, WordgramError>>()?;
        Ok(Self::new(models, policy))
    }

    /// Train from corpus files, each a JSON array of objects carrying
    /// `cfg.text_field`.
    pub fn from_corpus_files(
        files: &[CorpusFile],
        tokenizer: &Tokenizer,
        cfg: &WordgramConfig,
    ) -> Result<Self, WordgramError> {
        let mut corpora = BTreeMap::new();
        for file in files {
            corpora.insert(file.name.clone(), read_corpus(file, &cfg.text_field)?);
        }
        Self::from_corpora(&corpora, tokenizer, cfg)
    }

    /// Train one model per corpus and order, named `"{corpus}({n}-gram)"`.
    ///
    /// A corpus's documents are concatenated without a separator before
    /// tokenizing. Models are saved to `cfg.model_dir` when it is set.
    pub fn from_corpora(
        corpora: &BTreeMap<String, Vec<String>>,
        tokenizer: &Tokenizer,
        cfg: &WordgramConfig,
    ) -> Result<Self, WordgramError> {
        cfg.validate()?;
        if corpora.is_empty() {
            return Err(WordgramError::NoModels);
        }
        for name in corpora.keys() {
            check_model_name(name)?;
        }
        let mut models = Vec::with_capacity(corpora.len() * cfg.orders.len());
        for (name, texts) in corpora {
            let started = Instant::now();
            let joined = texts.concat();
            let tokens = tokenizer.tokenize(&joined).tokens;
            for &order in &cfg.orders {
                let model = WordgramModel::build(format!("{name}({order}-gram)"), &tokens, order);
                match &cfg.model_dir {
                    Some(dir) => {
                        let path = model.save(dir)?;
                        info!(model = %model.name, path = %path.display(), "wordgram model trained and saved");
                    }
                    None => info!(model = %model.name, "wordgram model trained"),
                }
                models.push(model);
            }
            debug!(
                corpus = %name,
                tokens = tokens.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "corpus processed"
            );
        }
        Ok(Self::new(models, cfg.empty_policy))
    }

    pub fn models(&self) -> &[WordgramModel] {
        &self.models
    }

    pub fn policy(&self) -> EmptyPolicy {
        self.policy
    }

    /// One score per model, keyed `importance_sample_with_{model name}`.
    pub fn score_fields<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<BTreeMap<String, f64>, WordgramError> {
        self.models
            .iter()
            .map(|model| {
                let score = model.score(tokens, self.policy)?;
                Ok((format!("{FIELD_PREFIX}{}", model.name), score))
            })
            .collect()
    }
}

fn read_corpus(file: &CorpusFile, text_field: &str) -> Result<Vec<String>, WordgramError> {
    let read_err = |reason: String| WordgramError::CorpusRead {
        path: file.file_path.display().to_string(),
        reason,
    };
    let raw = fs::read_to_string(&file.file_path).map_err(|e| read_err(e.to_string()))?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| read_err(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(read_err("expected a JSON array of objects".into()));
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.get(text_field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| read_err(format!("item {idx} has no string field '{text_field}'")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenize::TokenizeConfig;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new(TokenizeConfig::default()).unwrap()
    }

    fn wiki() -> BTreeMap<String, Vec<String>> {
        let mut corpora = BTreeMap::new();
        corpora.insert(
            "wiki".to_string(),
            vec!["北京 是 首都 ".to_string(), "北京 是 城市".to_string()],
        );
        corpora
    }

    #[test]
    fn builds_one_model_per_order() {
        let scorer =
            ImportanceScorer::from_corpora(&wiki(), &tokenizer(), &WordgramConfig::default())
                .unwrap();
        let names: Vec<&str> = scorer.models().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["wiki(2-gram)", "wiki(3-gram)"]);
    }

    #[test]
    fn documents_concatenated_without_separator() {
        let mut corpora = BTreeMap::new();
        corpora.insert("c".to_string(), vec!["ab".to_string(), "cd".to_string()]);
        let cfg = WordgramConfig::default().with_orders(vec![1]);
        let scorer = ImportanceScorer::from_corpora(&corpora, &tokenizer(), &cfg).unwrap();
        assert_eq!(scorer.models()[0].count(&["abcd"]), 1);
    }

    #[test]
    fn score_fields_keyed_by_model_name() {
        let scorer =
            ImportanceScorer::from_corpora(&wiki(), &tokenizer(), &WordgramConfig::default())
                .unwrap();
        let fields = scorer.score_fields(&["北京", "是", "首都"]).unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields["importance_sample_with_wiki(2-gram)"] < 0.0);
        assert!(fields["importance_sample_with_wiki(3-gram)"] < 0.0);
    }

    #[test]
    fn corpora_processed_in_name_order() {
        let mut corpora = wiki();
        corpora.insert("med".to_string(), vec!["病人 医生".to_string()]);
        let scorer =
            ImportanceScorer::from_corpora(&corpora, &tokenizer(), &WordgramConfig::default())
                .unwrap();
        assert_eq!(scorer.models()[0].name, "med(2-gram)");
    }

    #[test]
    fn persisted_models_replace_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WordgramConfig::default().with_model_dir(dir.path());
        let trained = ImportanceScorer::from_corpora(&wiki(), &tokenizer(), &cfg).unwrap();

        let specs = vec![ModelSpec {
            name: "wiki(2-gram)".into(),
            model_path: dir.path().join("wiki(2-gram).wgm"),
        }];
        let cfg = WordgramConfig::default()
            .with_models(specs)
            .with_corpora(vec![CorpusFile {
                name: "ignored".into(),
                file_path: dir.path().join("does-not-exist.json"),
            }]);
        let loaded = ImportanceScorer::from_config(&cfg, &tokenizer()).unwrap();
        assert_eq!(loaded.models().len(), 1);
        assert_eq!(loaded.models()[0], trained.models()[0]);
    }

    #[test]
    fn corpus_files_read_text_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.json");
        fs::write(&path, r#"[{"text": "北京 是 首都"}, {"text": "北京 是 城市"}]"#).unwrap();
        let cfg = WordgramConfig::default().with_corpora(vec![CorpusFile {
            name: "wiki".into(),
            file_path: path,
        }]);
        let scorer = ImportanceScorer::from_config(&cfg, &tokenizer()).unwrap();
        assert_eq!(scorer.models().len(), 2);
    }

    #[test]
    fn corpus_item_without_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"body": "x"}]"#).unwrap();
        let cfg = WordgramConfig::default().with_corpora(vec![CorpusFile {
            name: "bad".into(),
            file_path: path,
        }]);
        assert!(matches!(
            ImportanceScorer::from_config(&cfg, &tokenizer()),
            Err(WordgramError::CorpusRead { .. })
        ));
    }

    #[test]
    fn nothing_configured_is_an_error() {
        assert!(matches!(
            ImportanceScorer::from_config(&WordgramConfig::default(), &tokenizer()),
            Err(WordgramError::NoModels)
        ));
    }

    #[test]
    fn repeated_model_names_rejected_before_loading() {
        let spec = ModelSpec {
            name: "wiki(2-gram)".into(),
            model_path: "/nonexistent/a.wgm".into(),
        };
        let other = ModelSpec {
            model_path: "/nonexistent/b.wgm".into(),
            ..spec.clone()
        };
        assert!(matches!(
            ImportanceScorer::from_models(&[spec, other], EmptyPolicy::Zero),
            Err(WordgramError::DuplicateName { name }) if name == "wiki(2-gram)"
        ));
    }

    #[test]
    fn corpus_name_cannot_leave_model_dir() {
        let root = tempfile::tempdir().unwrap();
        let model_dir = root.path().join("models");
        let mut corpora = BTreeMap::new();
        corpora.insert("../escaped".to_string(), vec!["北京 是 首都".to_string()]);
        let cfg = WordgramConfig::default().with_model_dir(&model_dir);
        assert!(matches!(
            ImportanceScorer::from_corpora(&corpora, &tokenizer(), &cfg),
            Err(WordgramError::InvalidName { .. })
        ));
        assert!(!root.path().join("escaped(2-gram).wgm").exists());
        assert!(!model_dir.exists());
    }

    #[test]
    fn missing_model_file_fails_construction() {
        let specs = [ModelSpec {
            name: "gone".into(),
            model_path: "/nonexistent/gone.wgm".into(),
        }];
        assert!(matches!(
            ImportanceScorer::from_models(&specs, EmptyPolicy::Zero),
            Err(WordgramError::ModelLoad { .. })
        ));
    }

    #[test]
    fn scorer_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ImportanceScorer>();
    }
}
