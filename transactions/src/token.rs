//! Registry of ERC20 tokens known to a session.

use std::collections::HashMap;
use std::sync::Arc;

use ewm_types::{Address, Token};

/// Tokens keyed by contract address.
///
/// Owned by the session and passed to whatever needs lookups, so independent
/// sessions (and tests) never share state.
#[derive(Clone, Debug, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, Arc<Token>>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token, returning the shared handle.
    pub fn insert(&mut self, token: Token) -> Arc<Token> {
        let token = Arc::new(token);
        if self.tokens.insert(token.address, token.clone()).is_some() {
            tracing::debug!(address = %token.address, symbol = %token.symbol, "replaced token");
        }
        token
    }

    pub fn lookup(&self, address: &Address) -> Option<Arc<Token>> {
        self.tokens.get(address).cloned()
    }

    pub fn lookup_symbol(&self, symbol: &str) -> Option<Arc<Token>> {
        self.tokens
            .values()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Token>> {
        self.tokens.values()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
