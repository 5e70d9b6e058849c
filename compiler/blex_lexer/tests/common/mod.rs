//! Shared helpers for the integration tests.

use std::sync::Once;

use blex_lexer::{lex, LexOutput, LexerConfig, Token, TokenKind};
use blex_lexer_core::SourceBuffer;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Route lexer logs to the test writer. Filter with `BLEX_LOG=trace`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_env("BLEX_LOG"))
            .with_test_writer()
            .try_init();
    });
}

/// Lex `source` with the default config.
pub fn lex_default(source: &SourceBuffer) -> LexOutput<'_> {
    init_tracing();
    lex(source, LexerConfig::default())
}

/// Render tokens the way the grammar docs write them: `IDENT("BOOK")`.
pub fn render(tokens: &[Token<'_>]) -> Vec<String> {
    tokens.iter().map(ToString::to_string).collect()
}

/// Number of tokens of `kind`.
pub fn count(tokens: &[Token<'_>], kind: TokenKind) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}
