//! Lexer and recursive descent parser for LQL, the LinDB query language.
//!
//! ```
//! use lql_ast::Statement;
//!
//! let stmt = lql_parser::parse("SHOW TAG VALUES FROM cpu WITH KEY = host")?;
//! assert!(matches!(stmt, Statement::Show(_)));
//! # Ok::<(), lql_parser::ParseError>(())
//! ```
//!
//! Parsing is synchronous and holds no global state. Failures are reported
//! as a single [`ParseError`]; the parser does not attempt recovery.

pub mod config;
pub mod error;
mod expr;
pub mod lexer;
pub mod parser;
mod query;
mod show;
pub mod split;
mod stream;
mod time;
pub mod token;

use lql_ast::Statement;
use lql_ast::rebase::MapSpans;

pub use config::ParserConfig;
pub use error::{LexError, LexErrorKind, ParseError, ParseErrorKind};
pub use lexer::Lexer;
pub use parser::Parser;
pub use split::{StatementSlice, split_statements};
pub use token::{Token, TokenKind};

/// Parse one statement with the default [`ParserConfig`].
pub fn parse(text: &str) -> Result<Statement, ParseError> {
    Parser::new(text).parse_statement()
}

/// Parse a `;`-separated script. Spans and error locations refer to the
/// whole script.
pub fn parse_script(script: &str) -> Result<Vec<Statement>, ParseError> {
    parse_script_with_config(script, &ParserConfig::default())
}

/// [`parse_script`] with explicit limits. `max_query_len` applies to each
/// statement.
pub fn parse_script_with_config(
    script: &str,
    config: &ParserConfig,
) -> Result<Vec<Statement>, ParseError> {
    split_statements(script)
        .into_iter()
        .map(|slice| match Parser::with_config(slice.text, config).parse_statement() {
            Ok(mut stmt) => {
                stmt.rebase(slice.offset);
                Ok(stmt)
            }
            Err(mut err) => {
                err.rebase(slice.offset, slice.line - 1, slice.col - 1);
                Err(err)
            }
        })
        .collect()
}
