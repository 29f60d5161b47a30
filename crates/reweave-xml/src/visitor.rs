// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitors over XML trees.
//!
//! - [`XmlVisitor`]: rewriting; each `visit_*` defaults to the matching
//!   `walk_*`
//! - [`XmlSourceVisitor`]: accumulating, on top of [`Fold`]
//!
//! The cursor handed to `visit_x` has `x` as its value.

use std::sync::Arc;

use reweave_core::context::ExecutionContext;
use reweave_core::cursor::Cursor;
use reweave_core::tree::{downcast_source, SourceRef};
use reweave_core::visitor::{fold_children, Fold, TreeVisitor};

use crate::tree::{
    Attribute, CharData, Comment, Content, DocTypeDecl, Document, Misc, ProcessingInstruction, Prolog, Tag, Xml,
    XmlDecl,
};

/// Nearest tag above the cursor's node, not counting the node itself.
pub fn enclosing_tag(cursor: &Cursor<'_, Xml>) -> Option<Arc<Tag>> {
    cursor
        .parent()
        .and_then(|parent| parent.first_enclosing(|node| node.as_tag().cloned()))
}

// ============================================================================
// Rewriting visitor
// ============================================================================

pub trait XmlVisitor<P> {
    /// Visit a whole document from a fresh root cursor.
    fn visit_root(&mut self, document: Arc<Document>, p: &mut P) -> Arc<Document> {
        let cursor = Cursor::root(Xml::Document(Arc::clone(&document)));
        self.visit_document(document, &cursor, p)
    }

    fn visit_document(&mut self, document: Arc<Document>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Document> {
        walk_document(self, document, cursor, p)
    }

    fn visit_prolog(&mut self, prolog: Arc<Prolog>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Prolog> {
        walk_prolog(self, prolog, cursor, p)
    }

    fn visit_xml_decl(&mut self, decl: Arc<XmlDecl>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<XmlDecl> {
        walk_xml_decl(self, decl, cursor, p)
    }

    fn visit_processing_instruction(
        &mut self,
        pi: Arc<ProcessingInstruction>,
        _cursor: &Cursor<'_, Xml>,
        _p: &mut P,
    ) -> Arc<ProcessingInstruction> {
        pi
    }

    fn visit_doctype(&mut self, doctype: Arc<DocTypeDecl>, _cursor: &Cursor<'_, Xml>, _p: &mut P) -> Arc<DocTypeDecl> {
        doctype
    }

    fn visit_tag(&mut self, tag: Arc<Tag>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Tag> {
        walk_tag(self, tag, cursor, p)
    }

    fn visit_attribute(&mut self, attribute: Arc<Attribute>, _cursor: &Cursor<'_, Xml>, _p: &mut P) -> Arc<Attribute> {
        attribute
    }

    fn visit_char_data(&mut self, text: Arc<CharData>, _cursor: &Cursor<'_, Xml>, _p: &mut P) -> Arc<CharData> {
        text
    }

    fn visit_comment(&mut self, comment: Arc<Comment>, _cursor: &Cursor<'_, Xml>, _p: &mut P) -> Arc<Comment> {
        comment
    }

    /// Dispatch on the kind of tag content.
    fn visit_content(&mut self, content: Content, cursor: &Cursor<'_, Xml>, p: &mut P) -> Content {
        match content {
            Content::Tag(n) => Content::Tag(self.visit_tag(n, cursor, p)),
            Content::CharData(n) => Content::CharData(self.visit_char_data(n, cursor, p)),
            Content::Comment(n) => Content::Comment(self.visit_comment(n, cursor, p)),
            Content::ProcessingInstruction(n) => {
                Content::ProcessingInstruction(self.visit_processing_instruction(n, cursor, p))
            }
        }
    }

    /// Dispatch on the kind of prolog item.
    fn visit_misc(&mut self, misc: Misc, cursor: &Cursor<'_, Xml>, p: &mut P) -> Misc {
        match misc {
            Misc::Comment(n) => Misc::Comment(self.visit_comment(n, cursor, p)),
            Misc::ProcessingInstruction(n) => Misc::ProcessingInstruction(self.visit_processing_instruction(n, cursor, p)),
            Misc::DocTypeDecl(n) => Misc::DocTypeDecl(self.visit_doctype(n, cursor, p)),
        }
    }

    /// Erase this visitor for the pipeline.
    fn into_tree_visitor(self) -> Box<dyn TreeVisitor>
    where
        Self: XmlVisitor<ExecutionContext> + Sized + 'static,
    {
        Box::new(XmlTreeVisitor(self))
    }
}

pub fn walk_document<V, P>(visitor: &mut V, document: Arc<Document>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Document>
where
    V: XmlVisitor<P> + ?Sized,
{
    let prolog = {
        let child = cursor.push(Xml::Prolog(Arc::clone(&document.prolog)));
        visitor.visit_prolog(Arc::clone(&document.prolog), &child, p)
    };
    let root = {
        let child = cursor.push(Xml::Tag(Arc::clone(&document.root)));
        visitor.visit_tag(Arc::clone(&document.root), &child, p)
    };
    document.with_prolog(prolog).with_root(root)
}

pub fn walk_prolog<V, P>(visitor: &mut V, prolog: Arc<Prolog>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Prolog>
where
    V: XmlVisitor<P> + ?Sized,
{
    let xml_decl = prolog.xml_decl.as_ref().map(|decl| {
        let child = cursor.push(Xml::XmlDecl(Arc::clone(decl)));
        visitor.visit_xml_decl(Arc::clone(decl), &child, p)
    });
    let misc = prolog
        .misc
        .iter()
        .map(|misc| {
            let child = cursor.push(Xml::from(misc.clone()));
            visitor.visit_misc(misc.clone(), &child, p)
        })
        .collect();
    prolog.with_xml_decl(xml_decl).with_misc(misc)
}

pub fn walk_xml_decl<V, P>(visitor: &mut V, decl: Arc<XmlDecl>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<XmlDecl>
where
    V: XmlVisitor<P> + ?Sized,
{
    let attributes = visit_attributes(visitor, &decl.attributes, cursor, p);
    decl.with_attributes(attributes)
}

pub fn walk_tag<V, P>(visitor: &mut V, tag: Arc<Tag>, cursor: &Cursor<'_, Xml>, p: &mut P) -> Arc<Tag>
where
    V: XmlVisitor<P> + ?Sized,
{
    let attributes = visit_attributes(visitor, &tag.attributes, cursor, p);
    let content = tag.content.as_ref().map(|content| {
        content
            .iter()
            .map(|item| {
                let child = cursor.push(Xml::from(item.clone()));
                visitor.visit_content(item.clone(), &child, p)
            })
            .collect()
    });
    tag.with_attributes(attributes).with_content(content)
}

fn visit_attributes<V, P>(
    visitor: &mut V,
    attributes: &[Arc<Attribute>],
    cursor: &Cursor<'_, Xml>,
    p: &mut P,
) -> Vec<Arc<Attribute>>
where
    V: XmlVisitor<P> + ?Sized,
{
    attributes
        .iter()
        .map(|attribute| {
            let child = cursor.push(Xml::Attribute(Arc::clone(attribute)));
            visitor.visit_attribute(Arc::clone(attribute), &child, p)
        })
        .collect()
}

/// Adapts an [`XmlVisitor`] to the pipeline. Sources of other grammars pass
/// through untouched.
pub struct XmlTreeVisitor<V>(pub V);

impl<V: XmlVisitor<ExecutionContext>> TreeVisitor for XmlTreeVisitor<V> {
    fn visit_source(&mut self, source: SourceRef, ctx: &mut ExecutionContext) -> SourceRef {
        match downcast_source::<Document>(source) {
            Ok(document) => self.0.visit_root(document, ctx),
            Err(other) => other,
        }
    }
}

// ============================================================================
// Accumulating visitor
// ============================================================================

/// Per-variant hooks over [`Fold`].
pub trait XmlSourceVisitor: Fold<Xml> + Sized {
    fn visit_document(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        fold_children(self, cursor, fold_xml::<Self>)
    }

    fn visit_prolog(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        fold_children(self, cursor, fold_xml::<Self>)
    }

    fn visit_xml_decl(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        fold_children(self, cursor, fold_xml::<Self>)
    }

    fn visit_processing_instruction(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        self.default_to(cursor)
    }

    fn visit_doctype(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        self.default_to(cursor)
    }

    fn visit_tag(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        fold_children(self, cursor, fold_xml::<Self>)
    }

    fn visit_attribute(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        self.default_to(cursor)
    }

    fn visit_char_data(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        self.default_to(cursor)
    }

    fn visit_comment(&mut self, cursor: &Cursor<'_, Xml>) -> Self::Output {
        self.default_to(cursor)
    }

    /// Fold a whole document.
    fn fold_document(&mut self, document: &Arc<Document>) -> Self::Output {
        let cursor = Cursor::root(Xml::Document(Arc::clone(document)));
        fold_xml(self, &cursor)
    }
}

/// Dispatch to the hook for the node at `cursor`.
pub fn fold_xml<V: XmlSourceVisitor>(visitor: &mut V, cursor: &Cursor<'_, Xml>) -> V::Output {
    match cursor.value() {
        Xml::Document(_) => visitor.visit_document(cursor),
        Xml::Prolog(_) => visitor.visit_prolog(cursor),
        Xml::XmlDecl(_) => visitor.visit_xml_decl(cursor),
        Xml::ProcessingInstruction(_) => visitor.visit_processing_instruction(cursor),
        Xml::DocTypeDecl(_) => visitor.visit_doctype(cursor),
        Xml::Tag(_) => visitor.visit_tag(cursor),
        Xml::Attribute(_) => visitor.visit_attribute(cursor),
        Xml::CharData(_) => visitor.visit_char_data(cursor),
        Xml::Comment(_) => visitor.visit_comment(cursor),
    }
}

// ============================================================================
// Tests
// ============================================================================
