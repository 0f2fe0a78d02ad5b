//! Rewrites that let scripts written for SQLite run on `DuckDB`.
//!
//! Sample scripts are usually authored against SQLite, whose dialect differs from
//! `DuckDB` in a few places that matter for a schema-plus-inserts script:
//!
//! | SQLite | Rewrite |
//! |--------|---------|
//! | `PRAGMA ...;` | statement dropped |
//! | `INTEGER PRIMARY KEY [AUTOINCREMENT]` | `INTEGER PRIMARY KEY DEFAULT nextval('<seq>')`, sequence created first |
//! | `FOREIGN KEY (...) REFERENCES t (...)` | constraint dropped (SQLite does not enforce it by default) |
//! | `col INTEGER REFERENCES t (...)` | reference dropped |
//!
//! String literals and comments are never rewritten.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix of the sequences backing SQLite rowid-style keys.
const ROWID_SEQUENCE_PREFIX: &str = "salesdash_rowid_seq";

const PLACEHOLDER: char = '\u{0}';

const IDENT: &str = r#"(?:"[^"]*"|`[^`]*`|\[[^\]]*\]|[\w.]+)"#;
const FK_ACTIONS: &str =
    r"(?:\s+ON\s+(?:DELETE|UPDATE)\s+(?:SET\s+NULL|SET\s+DEFAULT|CASCADE|RESTRICT|NO\s+ACTION))*";

/// Compiled rewrite patterns.
struct DialectRules {
    rowid_key: Regex,
    autoincrement: Regex,
    table_foreign_key: Regex,
    column_reference: Regex,
    masked_literal: Regex,
}

impl DialectRules {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            rowid_key: Regex::new(r"(?i)\bINTEGER\s+PRIMARY\s+KEY(?:\s+AUTOINCREMENT)?\b")?,
            autoincrement: Regex::new(r"(?i)\s*\bAUTOINCREMENT\b")?,
            table_foreign_key: Regex::new(&format!(
                r"(?i),\s*(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*\([^)]*\)\s*REFERENCES\s+{IDENT}\s*(?:\([^)]*\))?{FK_ACTIONS}"
            ))?,
            column_reference: Regex::new(&format!(
                r"(?i)\s+REFERENCES\s+{IDENT}\s*(?:\([^)]*\))?{FK_ACTIONS}"
            ))?,
            masked_literal: Regex::new("\u{0}(\\d+)\u{0}")?,
        })
    }
}

static RULES: LazyLock<Option<DialectRules>> = LazyLock::new(|| DialectRules::compile().ok());

/// A slice of the script: SQL text, a string literal, or a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Code(&'a str),
    Literal(&'a str),
    Comment,
}

/// Rewrite the SQLite-only constructs of `script` into their `DuckDB` equivalents.
///
/// Scripts that already speak `DuckDB` keep their statements; they only lose comments
/// and foreign-key clauses, and integer keys gain a sequence default that explicit ids
/// override.
pub(crate) fn adapt_sqlite_dialect(script: &str) -> String {
    let Some(rules) = RULES.as_ref() else {
        return script.to_string();
    };
    let mut adapted = String::with_capacity(script.len());
    let mut sequences = 0_usize;

    for statement in split_statements(&split_pieces(script)) {
        let mut literals = Vec::new();
        let mut masked = String::new();
        for piece in &statement {
            match piece {
                Piece::Code(code) => masked.push_str(code),
                Piece::Literal(literal) => {
                    masked.push(PLACEHOLDER);
                    masked.push_str(&literals.len().to_string());
                    masked.push(PLACEHOLDER);
                    literals.push(*literal);
                }
                Piece::Comment => masked.push(' '),
            }
        }

        if first_keyword(&masked).eq_ignore_ascii_case("PRAGMA") {
            continue;
        }

        let mut rewritten = rules.table_foreign_key.replace_all(&masked, "").into_owned();
        rewritten = rules.column_reference.replace_all(&rewritten, "").into_owned();

        if first_keyword(&rewritten).eq_ignore_ascii_case("CREATE")
            && rules.rowid_key.is_match(&rewritten)
        {
            sequences += 1;
            let sequence = format!("{ROWID_SEQUENCE_PREFIX}_{sequences}");
            adapted.push_str(&format!("CREATE SEQUENCE IF NOT EXISTS {sequence};\n"));
            let key = format!("INTEGER PRIMARY KEY DEFAULT nextval('{sequence}')");
            rewritten = rules.rowid_key.replacen(&rewritten, 1, key.as_str()).into_owned();
        }
        rewritten = rules.autoincrement.replace_all(&rewritten, "").into_owned();

        let restored =
            rules
                .masked_literal
                .replace_all(&rewritten, |captures: &regex::Captures<'_>| {
                    captures[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| literals.get(index))
                        .map_or_else(String::new, |literal| (*literal).to_string())
                });
        adapted.push_str(&restored);
    }

    adapted
}

/// Split into code, string literals and comments. Unterminated literals and block
/// comments run to the end of the script.
fn split_pieces(script: &str) -> Vec<Piece<'_>> {
    let bytes = script.as_bytes();
    let mut pieces = Vec::new();
    let (mut start, mut index) = (0, 0);

    while index < bytes.len() {
        let piece_end = match (bytes[index], bytes.get(index + 1)) {
            (b'\'', _) => Some((quoted_end(bytes, index), true)),
            (b'-', Some(b'-')) => Some((line_comment_end(bytes, index), false)),
            (b'/', Some(b'*')) => Some((block_comment_end(bytes, index), false)),
            _ => None,
        };
        let Some((end, is_literal)) = piece_end else {
            index += 1;
            continue;
        };

        if start < index {
            pieces.push(Piece::Code(&script[start..index]));
        }
        pieces.push(if is_literal {
            Piece::Literal(&script[index..end])
        } else {
            Piece::Comment
        });
        start = end;
        index = end;
    }
    if start < bytes.len() {
        pieces.push(Piece::Code(&script[start..]));
    }
    pieces
}

fn quoted_end(bytes: &[u8], open: usize) -> usize {
    let mut index = open + 1;
    while index < bytes.len() {
        if bytes[index] == b'\'' {
            if bytes.get(index + 1) == Some(&b'\'') {
                index += 2;
                continue;
            }
            return index + 1;
        }
        index += 1;
    }
    bytes.len()
}

fn line_comment_end(bytes: &[u8], open: usize) -> usize {
    bytes[open..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map_or(bytes.len(), |offset| open + offset)
}

fn block_comment_end(bytes: &[u8], open: usize) -> usize {
    bytes[open + 2..]
        .windows(2)
        .position(|pair| pair == b"*/")
        .map_or(bytes.len(), |offset| open + 2 + offset + 2)
}

/// Group pieces into statements, each ending after its `;` when it has one.
fn split_statements<'a>(pieces: &[Piece<'a>]) -> Vec<Vec<Piece<'a>>> {
    let mut statements = Vec::new();
    let mut current = Vec::new();

    for piece in pieces {
        let Piece::Code(code) = piece else {
            current.push(*piece);
            continue;
        };
        let mut rest = *code;
        while let Some(semicolon) = rest.find(';') {
            current.push(Piece::Code(&rest[..=semicolon]));
            statements.push(std::mem::take(&mut current));
            rest = &rest[semicolon + 1..];
        }
        if !rest.is_empty() {
            current.push(Piece::Code(rest));
        }
    }
    if !current.is_empty() {
        statements.push(current);
    }
    statements
}

fn first_keyword(sql: &str) -> &str {
    sql.split(|ch: char| !ch.is_ascii_alphabetic())
        .find(|word| !word.is_empty())
        .unwrap_or_default()
}
