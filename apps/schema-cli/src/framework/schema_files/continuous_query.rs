//! # Continuous-Query Extractor
//!
//! Pulls whole `CREATE CONTINUOUS QUERY <name> ON <db> … END` statement
//! blocks out of a schema file. The body between the `ON <db>` clause and the
//! closing `END` is deliberately opaque — it may span multiple lines, carry a
//! `RESAMPLE` clause, and contain nested keywords — so extraction is a
//! delimiter scan, not a parse of the query language.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    // (?is): case-insensitive, dot matches newlines; the lazy `.*?` stops at
    // the first standalone END. Query names may contain dots, so the name
    // capture is any run of non-quote, non-whitespace characters.
    static ref CONTINUOUS_QUERY: Regex = Regex::new(
        r#"(?is)create\s+continuous\s+query\s+"?(?P<name>[^"\s]+)"?\s+on\s+"?(?P<db>[^"\s]+)"?.*?\bend\b"#
    )
    .expect("valid CREATE CONTINUOUS QUERY pattern");
}

/// Extracted statements keyed by database name, then query name. The stored
/// text is the full statement as written, without a trailing terminator.
pub type ExtractedQueries = BTreeMap<String, BTreeMap<String, String>>;

/// Extracts every continuous-query block from one schema file's text.
///
/// A duplicate query name within one file overwrites the earlier block;
/// cross-file handling (and its last-wins semantics) belongs to the caller
/// merging per-file results.
pub fn extract_continuous_queries(text: &str) -> ExtractedQueries {
    let mut queries = ExtractedQueries::new();
    for caps in CONTINUOUS_QUERY.captures_iter(text) {
        let statement = caps
            .get(0)
            .expect("whole match always present")
            .as_str()
            .trim()
            .trim_end_matches(';')
            .to_string();
        queries
            .entry(caps["db"].to_string())
            .or_default()
            .insert(caps["name"].to_string(), statement);
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_query() {
        let text = r#"CREATE CONTINUOUS QUERY "cq_hourly" ON "metrics" BEGIN SELECT mean(value) INTO hourly FROM raw GROUP BY time(1h) END"#;
        let queries = extract_continuous_queries(text);
        assert_eq!(queries["metrics"]["cq_hourly"], text);
    }

    #[test]
    fn test_multi_line_query_with_resample() {
        let text = "CREATE CONTINUOUS QUERY cq ON metrics\nRESAMPLE EVERY 10m FOR 30m\nBEGIN\n  SELECT mean(value) INTO hourly\n  FROM raw\n  GROUP BY time(1h)\nEND\n";
        let queries = extract_continuous_queries(text);
        assert_eq!(queries["metrics"]["cq"], text.trim());
    }

    #[test]
    fn test_dotted_query_name_is_kept_verbatim() {
        let text = "CREATE CONTINUOUS QUERY metrics.rollup.1h ON metrics BEGIN SELECT 1 INTO x FROM y END";
        let queries = extract_continuous_queries(text);
        assert!(queries["metrics"].contains_key("metrics.rollup.1h"));
    }

    #[test]
    fn test_multiple_queries_in_one_file() {
        let text = "\
CREATE CONTINUOUS QUERY one ON db1 BEGIN SELECT 1 INTO a FROM b END

# unrelated comment text between blocks

CREATE CONTINUOUS QUERY two ON db2 BEGIN SELECT 2 INTO c FROM d END;
";
        let queries = extract_continuous_queries(text);
        assert_eq!(queries.len(), 2);
        assert!(queries["db1"].contains_key("one"));
        // Trailing semicolon is not part of the stored statement.
        assert!(!queries["db2"]["two"].ends_with(';'));
    }

    #[test]
    fn test_body_keywords_do_not_end_the_block_early() {
        // "end_time" must not terminate the scan; only a standalone END does.
        let text = "CREATE CONTINUOUS QUERY cq ON db BEGIN SELECT max(end_time) INTO x FROM y END";
        let queries = extract_continuous_queries(text);
        assert!(queries["db"]["cq"].ends_with("FROM y END"));
    }

    #[test]
    fn test_no_queries_in_unrelated_text() {
        assert!(extract_continuous_queries("# just a comment\n").is_empty());
    }
}
