// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing properties trees.

use reweave_core::print::{Codegen, CodegenState};

use crate::tree::{Comment, Content, Entry, File, Properties, Value};

impl Codegen for File {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.prefix.whitespace);
        for content in &self.content {
            content.codegen(state);
        }
        state.add_token(&self.eof.whitespace);
    }
}

impl Codegen for Content {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Content::Entry(entry) => entry.codegen(state),
            Content::Comment(comment) => comment.codegen(state),
        }
    }
}

impl Codegen for Entry {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.prefix.whitespace);
        state.add_token(&self.key);
        state.add_token(&self.before_equals.whitespace);
        state.add_token(self.delimiter.as_str());
        self.value.codegen(state);
    }
}

impl Codegen for Value {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.prefix.whitespace);
        state.add_token(&self.text);
    }
}

impl Codegen for Comment {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_token(&self.prefix.whitespace);
        state.add_token(self.delimiter.as_str());
        state.add_token(&self.message);
    }
}

impl Codegen for Properties {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Properties::File(node) => node.codegen(state),
            Properties::Entry(node) => node.codegen(state),
            Properties::Value(node) => node.codegen(state),
            Properties::Comment(node) => node.codegen(state),
        }
    }
}
