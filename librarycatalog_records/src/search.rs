use crate::api::{BookFilter, BookRecord, BookSearchResult, Pagination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl PageLimits {
    /// Resolves the requested page, out of range limits fall back to the default
    pub fn resolve(&self, pagination: Pagination) -> (usize, usize) {
        let limit = pagination
            .limit
            .filter(|limit| *limit > 0 && *limit <= self.max_limit)
            .unwrap_or(self.default_limit);
        (limit, pagination.offset.unwrap_or_default())
    }
}

fn contains_ignore_case(value: Option<&str>, needle: &Option<String>) -> bool {
    match needle.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => value
            .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

impl BookFilter {
    pub fn matches(&self, book: &BookRecord) -> bool {
        contains_ignore_case(Some(book.title.as_str()), &self.title)
            && contains_ignore_case(book.author.as_deref(), &self.author)
            && contains_ignore_case(book.genre.as_deref(), &self.genre)
            && match self.tag.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(tag) => book.tags.iter().any(|t| t == tag),
            }
    }
}

/// Filters the books, keeping collection order, and cuts out the requested page
pub fn search_books(
    books: &[BookRecord],
    filter: &BookFilter,
    pagination: Pagination,
    limits: PageLimits,
) -> BookSearchResult {
    let (limit, offset) = limits.resolve(pagination);
    let matching: Vec<&BookRecord> = books.iter().filter(|book| filter.matches(book)).collect();
    BookSearchResult {
        total: matching.len(),
        books: matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod search_tests {
    use super::*;

    fn book(id: i32, title: &str, author: &str, genre: &str, tags: &[&str]) -> BookRecord {
        BookRecord {
            id,
            title: title.to_string(),
            author: Some(author.to_string()),
            genre: Some(genre.to_string()),
            image: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            copies: 1,
            available: 1,
        }
    }

    fn sample_books() -> Vec<BookRecord> {
        vec![
            book(1, "Stone Butch Blues", "Leslie Feinberg", "fiction", &["classic"]),
            book(2, "Gender Outlaw", "Kate Bornstein", "nonfiction", &["blue"]),
            book(3, "Zami", "Audre Lorde", "biography", &["blue", "danube"]),
        ]
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let result = search_books(
            &sample_books(),
            &BookFilter::default(),
            Pagination::default(),
            PageLimits::default(),
        );
        assert_eq!(result.total, 3);
        assert_eq!(result.books, sample_books());
    }

    #[test]
    /// Tests filters
    /// 1. Title substring ignores case
    /// 2. Tag must match exactly
    /// 3. Filters are combined
    fn test_filters() {
        let books = sample_books();
        let by_title = BookFilter {
            title: Some("OUTLAW".to_string()),
            ..BookFilter::default()
        };
        let result = search_books(&books, &by_title, Pagination::default(), PageLimits::default());
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2]);

        let by_tag = BookFilter {
            tag: Some("blue".to_string()),
            ..BookFilter::default()
        };
        let result = search_books(&books, &by_tag, Pagination::default(), PageLimits::default());
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3]);

        let combined = BookFilter {
            genre: Some("bio".to_string()),
            ..by_tag
        };
        let result = search_books(&books, &combined, Pagination::default(), PageLimits::default());
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(result.total, 1);
    }

    #[test]
    /// Tests that blank filters are ignored and the tag filter is trimmed
    fn test_blank_filters_match_everything() {
        let books = sample_books();
        let blank = BookFilter {
            title: Some("".to_string()),
            tag: Some("  ".to_string()),
            ..BookFilter::default()
        };
        let result = search_books(&books, &blank, Pagination::default(), PageLimits::default());
        assert_eq!(result.total, 3);

        let padded_tag = BookFilter {
            tag: Some(" classic ".to_string()),
            ..BookFilter::default()
        };
        let result = search_books(
            &books,
            &padded_tag,
            Pagination::default(),
            PageLimits::default(),
        );
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_pagination() {
        let books = sample_books();
        let limits = PageLimits {
            default_limit: 2,
            max_limit: 2,
        };

        let result = search_books(&books, &BookFilter::default(), Pagination::default(), limits);
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(result.total, 3);

        let second_page = Pagination {
            limit: Some(50),
            offset: Some(2),
        };
        let result = search_books(&books, &BookFilter::default(), second_page, limits);
        assert_eq!(result.books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3]);

        assert_eq!(
            limits.resolve(Pagination {
                limit: Some(0),
                offset: None
            }),
            (2, 0)
        );
    }
}
