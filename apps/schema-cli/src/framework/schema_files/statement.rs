//! # Declarative Statement Parser
//!
//! Parses database schema files: one logical statement per non-empty,
//! non-comment line. Exactly two statement shapes are recognized,
//! case-insensitively, with optional quoted identifiers and an optional
//! trailing semicolon:
//!
//! ```text
//! CREATE DATABASE <name> [WITH DURATION <dur> REPLICATION <n>
//!                         SHARD DURATION <dur> NAME <rp_name>]
//! CREATE RETENTION POLICY <name> ON <db> DURATION <dur> REPLICATION <n>
//!                         SHARD DURATION <dur> [DEFAULT]
//! ```
//!
//! The optional WITH clause is an inline default retention policy owned by
//! the database it creates. Any other non-blank line is a parse error
//! carrying the offending text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::framework::core::schema::RetentionPolicy;

lazy_static! {
    static ref CREATE_DATABASE: Regex = Regex::new(
        r#"(?i)^\s*create\s+database\s+"?(?P<name>[^"\s;]+)"?(?:\s+with\s+duration\s+(?P<dur>[^\s;]+)\s+replication\s+(?P<repl>\d+)\s+shard\s+duration\s+(?P<shard>[^\s;]+)\s+name\s+"?(?P<rp>[^"\s;]+)"?)?\s*;?\s*$"#
    )
    .expect("valid CREATE DATABASE pattern");
    static ref CREATE_RETENTION_POLICY: Regex = Regex::new(
        r#"(?i)^\s*create\s+retention\s+policy\s+"?(?P<name>[^"\s;]+)"?\s+on\s+"?(?P<db>[^"\s;]+)"?\s+duration\s+(?P<dur>[^\s;]+)\s+replication\s+(?P<repl>\d+)\s+shard\s+duration\s+(?P<shard>[^\s;]+)(?:\s+(?P<default>default))?\s*;?\s*$"#
    )
    .expect("valid CREATE RETENTION POLICY pattern");
}

/// A retention policy together with the database that owns it. Parsing keeps
/// the pair flat; ownership is resolved when the desired snapshot is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicyEntry {
    pub database: String,
    pub policy: RetentionPolicy,
}

/// The statements of one database schema file, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParsedStatements {
    pub databases: Vec<String>,
    pub retention_policies: Vec<RetentionPolicyEntry>,
}

/// A line that matched neither statement shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unparseable statement: '{line}'")]
pub struct StatementParseError {
    pub line: String,
}

fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// The regex only admits digits here, but the count may still exceed u64.
fn parse_replication(digits: &str, line: &str) -> Result<u64, StatementParseError> {
    digits.parse().map_err(|_| StatementParseError {
        line: line.trim().to_string(),
    })
}

/// Parses one database schema file.
pub fn parse_statements(text: &str) -> Result<ParsedStatements, StatementParseError> {
    let mut parsed = ParsedStatements::default();

    for line in text.lines() {
        if is_comment_or_blank(line) {
            continue;
        }

        if let Some(caps) = CREATE_DATABASE.captures(line) {
            let name = caps["name"].to_string();
            if let Some(duration) = caps.name("dur") {
                // The inline WITH clause declares the database's default
                // retention policy.
                parsed.retention_policies.push(RetentionPolicyEntry {
                    database: name.clone(),
                    policy: RetentionPolicy {
                        name: caps["rp"].to_string(),
                        duration: duration.as_str().to_string(),
                        shard_duration: caps["shard"].to_string(),
                        replication: parse_replication(&caps["repl"], line)?,
                        is_default: true,
                    },
                });
            }
            parsed.databases.push(name);
        } else if let Some(caps) = CREATE_RETENTION_POLICY.captures(line) {
            parsed.retention_policies.push(RetentionPolicyEntry {
                database: caps["db"].to_string(),
                policy: RetentionPolicy {
                    name: caps["name"].to_string(),
                    duration: caps["dur"].to_string(),
                    shard_duration: caps["shard"].to_string(),
                    replication: parse_replication(&caps["repl"], line)?,
                    is_default: caps.name("default").is_some(),
                },
            });
        } else {
            return Err(StatementParseError {
                line: line.trim().to_string(),
            });
        }
    }

    Ok(parsed)
}
