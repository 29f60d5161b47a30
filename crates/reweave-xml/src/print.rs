// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing XML trees.

use reweave_core::print::{Codegen, CodegenState};
use reweave_core::tree::Space;

use crate::tree::{
    Attribute, CharData, Comment, Content, DocTypeDecl, Document, Misc, ProcessingInstruction, Prolog, Tag, Xml,
    XmlDecl,
};

fn space(state: &mut CodegenState, space: &Space) {
    state.add_token(&space.whitespace);
}

impl Codegen for Document {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        self.prolog.codegen(state);
        self.root.codegen(state);
        space(state, &self.eof);
    }
}

impl Codegen for Prolog {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        self.xml_decl.codegen(state);
        for misc in &self.misc {
            match misc {
                Misc::Comment(n) => n.codegen(state),
                Misc::ProcessingInstruction(n) => n.codegen(state),
                Misc::DocTypeDecl(n) => n.codegen(state),
            }
        }
    }
}

impl Codegen for XmlDecl {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token("<?xml");
        for attribute in &self.attributes {
            attribute.codegen(state);
        }
        space(state, &self.before_close);
        state.add_token("?>");
    }
}

impl Codegen for ProcessingInstruction {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token("<?");
        state.add_token(&self.target);
        state.add_token(&self.data);
        state.add_token("?>");
    }
}

impl Codegen for DocTypeDecl {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token("<!DOCTYPE");
        state.add_token(&self.text);
        state.add_token(">");
    }
}

impl Codegen for Tag {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token("<");
        state.add_token(&self.name);
        for attribute in &self.attributes {
            attribute.codegen(state);
        }
        space(state, &self.before_close);
        match (&self.content, &self.closing) {
            (Some(content), Some(closing)) => {
                state.add_token(">");
                for child in content {
                    child.codegen(state);
                }
                space(state, &closing.prefix);
                state.add_token("</");
                state.add_token(&closing.name);
                space(state, &closing.before_close);
                state.add_token(">");
            }
            _ => state.add_token("/>"),
        }
    }
}

impl Codegen for Content {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Content::Tag(n) => n.codegen(state),
            Content::CharData(n) => n.codegen(state),
            Content::Comment(n) => n.codegen(state),
            Content::ProcessingInstruction(n) => n.codegen(state),
        }
    }
}

impl Codegen for Attribute {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token(&self.key);
        space(state, &self.before_equals);
        state.add_token("=");
        space(state, &self.after_equals);
        state.add_token(self.quote.as_str());
        state.add_token(&self.value);
        state.add_token(self.quote.as_str());
    }
}

impl Codegen for CharData {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        if self.cdata {
            state.add_token("<![CDATA[");
            state.add_token(&self.text);
            state.add_token("]]>");
        } else {
            state.add_token(&self.text);
        }
    }
}

impl Codegen for Comment {
    fn codegen(&self, state: &mut CodegenState) {
        space(state, &self.prefix);
        state.add_token("<!--");
        state.add_token(&self.text);
        state.add_token("-->");
    }
}

impl Codegen for Xml {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Xml::Document(n) => n.codegen(state),
            Xml::Prolog(n) => n.codegen(state),
            Xml::XmlDecl(n) => n.codegen(state),
            Xml::ProcessingInstruction(n) => n.codegen(state),
            Xml::DocTypeDecl(n) => n.codegen(state),
            Xml::Tag(n) => n.codegen(state),
            Xml::Attribute(n) => n.codegen(state),
            Xml::CharData(n) => n.codegen(state),
            Xml::Comment(n) => n.codegen(state),
        }
    }
}
