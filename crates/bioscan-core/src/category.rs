use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Reference list of category names that free-form guesses are snapped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: Vec<String>,
}

impl CategoryIndex {
    pub fn new(categories: Vec<String>) -> Self {
        let categories = categories
            .into_iter()
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty())
            .collect();
        Self { categories }
    }

    /// One category per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Snaps `guess` to the closest listed category.
    ///
    /// An empty index passes the guess through; a non-empty index with no
    /// fuzzy match yields `None`.
    pub fn best_match(&self, guess: &str) -> Option<String> {
        let guess = guess.trim();
        if guess.is_empty() {
            return None;
        }
        if self.categories.is_empty() {
            return Some(guess.to_string());
        }
        if let Some(exact) = self
            .categories
            .iter()
            .find(|category| category.eq_ignore_ascii_case(guess))
        {
            return Some(exact.clone());
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let mut best: Option<(i64, &String)> = None;
        for category in &self.categories {
            let score = matcher
                .fuzzy_match(category, guess)
                .into_iter()
                .chain(matcher.fuzzy_match(guess, category))
                .max();
            let Some(score) = score else {
                continue;
            };
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, category));
            }
        }
        best.map(|(_, category)| category.clone())
    }
}
