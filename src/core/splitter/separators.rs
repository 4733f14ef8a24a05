//! Separator sets for the recursive splitter.
//!
//! Each set is ordered from the most structural boundary to the least;
//! every set ends with the per-character fallback so splitting always
//! makes progress.

use once_cell::sync::Lazy;
use regex::Regex;

/// A boundary the splitter may cut at
#[derive(Debug, Clone)]
pub enum Separator {
    /// Cut before each match; the match starts the following piece
    Leading(Regex),

    /// Cut after each match; the match ends the preceding piece
    Trailing(Regex),

    /// Cut between every character
    Character,
}

impl Separator {
    fn pattern(pattern: &str) -> Self {
        Separator::Leading(Regex::new(pattern).unwrap())
    }

    fn literal(text: &str) -> Self {
        Separator::Leading(Regex::new(&regex::escape(text)).unwrap())
    }

    fn sentence_end() -> Self {
        Separator::Trailing(Regex::new(r"[.!?]\s+").unwrap())
    }

    /// Whether this separator occurs anywhere in `text`
    pub fn occurs_in(&self, text: &str) -> bool {
        match self {
            Separator::Leading(re) | Separator::Trailing(re) => re.is_match(text),
            Separator::Character => !text.is_empty(),
        }
    }

    /// Cut `text` into contiguous pieces at every occurrence.
    ///
    /// Separators are kept, never dropped: concatenating the returned
    /// pieces yields `text` exactly. Empty pieces are omitted.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let cuts: Vec<usize> = match self {
            Separator::Leading(re) => re.find_iter(text).map(|m| m.start()).collect(),
            Separator::Trailing(re) => re.find_iter(text).map(|m| m.end()).collect(),
            Separator::Character => text.char_indices().skip(1).map(|(i, _)| i).collect(),
        };

        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for cut in cuts {
            if cut > start {
                pieces.push(&text[start..cut]);
                start = cut;
            }
        }
        if start < text.len() {
            pieces.push(&text[start..]);
        }

        pieces
    }
}

fn generic() -> Vec<Separator> {
    vec![
        Separator::literal("\n\n"),
        Separator::literal("\n"),
        Separator::sentence_end(),
        Separator::literal(" "),
        Separator::Character,
    ]
}

/// Paragraph, line, sentence, word, character
pub static GENERIC_SEPARATORS: Lazy<Vec<Separator>> = Lazy::new(generic);

/// Headings, fences and rules before the generic boundaries
pub static MARKDOWN_SEPARATORS: Lazy<Vec<Separator>> = Lazy::new(|| {
    let mut separators = vec![
        Separator::pattern(r"\n#{1,6} "),
        Separator::pattern(r"```\n"),
        Separator::pattern(r"\n\*\*\*+\n"),
        Separator::pattern(r"\n---+\n"),
        Separator::pattern(r"\n___+\n"),
    ];
    separators.extend(generic());
    separators
});

/// Block-level and structural tags before the generic boundaries
pub static HTML_SEPARATORS: Lazy<Vec<Separator>> = Lazy::new(|| {
    let tags = [
        "<body", "<div", "<p", "<br", "<li", "<h1", "<h2", "<h3", "<h4", "<h5", "<h6", "<span",
        "<table", "<tr", "<td", "<th", "<ul", "<ol", "<header", "<footer", "<nav", "<head",
        "<style", "<script", "<meta", "<title",
    ];
    let mut separators: Vec<Separator> = tags.iter().map(|t| Separator::literal(t)).collect();
    separators.extend(generic());
    separators
});
