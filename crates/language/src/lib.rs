//! Language identification for docsift records.
//!
//! Each document gets a `language` code (ISO 639-3, `"und"` when nothing
//! can be detected) and a `prop` confidence in `[0, 1]`, rounded to 4
//! decimals. Detection is trigram/script based and fully deterministic.
//!
//! ```rust
//! use language::{LanguageConfig, LanguageIdentifier};
//!
//! let identifier = LanguageIdentifier::new(&LanguageConfig::default()).unwrap();
//! let detection = identifier.identify("我 爱 北京 天安门");
//! assert_eq!(detection.language, "cmn");
//! ```

mod config;
mod detect;

pub use crate::config::{LanguageConfig, LanguageError};
pub use crate::detect::{Detection, LanguageIdentifier, UNDETERMINED};
