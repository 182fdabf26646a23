//! Stopword lists.

use fxhash::FxHashSet;

/// Built-in Chinese stopwords (function words, pronouns, particles).
const CHINESE: &[&str] = &[
    "的", "了", "和", "是", "就", "都", "而", "及", "与", "着", "或", "一个", "没有", "我", "你",
    "他", "她", "它", "我们", "你们", "他们", "她们", "它们", "这", "那", "这个", "那个", "这些",
    "那些", "在", "也", "有", "啊", "吧", "呢", "吗", "嘛", "哦", "呀", "把", "被", "让", "给",
    "从", "向", "对", "于", "以", "之", "为", "其", "中", "等", "很", "不", "要", "会", "能",
    "可以", "什么", "怎么", "因为", "所以", "但是", "如果", "虽然", "然后", "还是", "而且",
    "并且", "或者", "只是", "已经", "就是", "自己", "这样", "那样", "这里", "那里", "哪里",
    "谁", "每", "各", "某", "另", "此", "该", "些", "得", "地", "所", "由", "将", "并", "则",
    "即", "又", "再", "还", "才", "却", "只", "更", "最", "太", "非常", "比较",
];

/// Built-in English stopwords.
const ENGLISH: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "to", "in", "on", "at", "by",
    "for", "with", "from", "as", "into", "about", "is", "are", "was", "were", "be", "been",
    "being", "am", "do", "does", "did", "have", "has", "had", "it", "its", "this", "that",
    "these", "those", "i", "you", "he", "she", "we", "they", "me", "him", "her", "us", "them",
    "my", "your", "his", "our", "their", "not", "no", "so", "than", "too", "very", "can",
    "will", "just", "there", "here", "what", "which", "who", "whom", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "only",
    "own", "same", "should", "would", "could",
];

/// A stopword set used for filtering token sequences.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: FxHashSet<String>,
}

impl Stopwords {
    /// An empty stopword set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in Chinese and English lists.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.extend(CHINESE.iter().chain(ENGLISH.iter()).copied());
        set
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(words.into_iter().map(Into::into));
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Keep tokens that are not stopwords, preserving order.
    pub fn filter<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !self.contains(t))
            .map(str::to_string)
            .collect()
    }
}
