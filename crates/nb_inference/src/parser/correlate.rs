use nb_core::Article;

/// Maps the n-th `Article N:` marker of a response (zero-based, in order of
/// appearance) to the article its bullets belong to.
pub trait ArticleCorrelator {
    fn correlate(&self, position: usize) -> Option<&Article>;
}

/// Matches markers to the request batch purely by position. The number
/// printed after `Article` is ignored; extra markers resolve to nothing.
#[derive(Debug, Clone, Copy)]
pub struct PositionalCorrelator<'a> {
    articles: &'a [Article],
}

impl<'a> PositionalCorrelator<'a> {
    pub fn new(articles: &'a [Article]) -> Self {
        Self { articles }
    }
}

impl ArticleCorrelator for PositionalCorrelator<'_> {
    fn correlate(&self, position: usize) -> Option<&Article> {
        self.articles.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_lookup() {
        let articles = vec![Article::new("a", "https://a"), Article::new("b", "https://b")];
        let correlator = PositionalCorrelator::new(&articles);
        assert_eq!(correlator.correlate(1).map(|a| a.url.as_str()), Some("https://b"));
        assert!(correlator.correlate(2).is_none());
    }
}
