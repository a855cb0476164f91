//! Core index types for the flat AST.
//!
//! Nodes reference children and siblings by 32-bit indices into a single
//! append-only array; tokens are addressed the same way. `u32::MAX` is the
//! "none" sentinel for both.

use serde::Serialize;

/// Index of a node in the parser's node array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == NodeId::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != NodeId::NONE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a token in the parser's token array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TokenId(pub u32);

impl TokenId {
    pub const NONE: TokenId = TokenId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == TokenId::NONE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
