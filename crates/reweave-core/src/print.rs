// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing trees back to text.
//!
//! Every node type implements [`Codegen`], writing its tokens and the
//! whitespace it owns into a [`CodegenState`]. Printing a freshly parsed tree
//! reproduces the input byte for byte.

use std::fmt;
use std::sync::Arc;

use crate::tree::{CommentStyle, Space};

/// Output buffer for [`Codegen`].
#[derive(Debug, Default)]
pub struct CodegenState {
    tokens: String,
}

impl CodegenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, token: &str) {
        self.tokens.push_str(token);
    }

    pub fn into_string(self) -> String {
        self.tokens
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens)
    }
}

/// Writes a node's text.
pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);

    /// Print to a new string.
    fn print(&self) -> String {
        let mut state = CodegenState::new();
        self.codegen(&mut state);
        state.into_string()
    }
}

impl<T: Codegen + ?Sized> Codegen for Arc<T> {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state)
    }
}

impl<T: Codegen> Codegen for Option<T> {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(value) = self {
            value.codegen(state)
        }
    }
}

impl Codegen for Space {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.whitespace);
        for comment in &self.comments {
            match comment.style {
                CommentStyle::Line => {
                    state.add_token("//");
                    state.add_token(&comment.text);
                }
                CommentStyle::Block => {
                    state.add_token("/*");
                    state.add_token(&comment.text);
                    state.add_token("*/");
                }
            }
            state.add_token(&comment.suffix);
        }
    }
}
