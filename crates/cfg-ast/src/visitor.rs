//! Dispatch on node kinds without matching on them at every use site.

use cfg_yellow::SyntaxKind::*;
use cfg_yellow::{NodeOrToken, SyntaxElement, SyntaxNode, SyntaxTree};

use crate::Node;
use crate::nodes::{
    ArgList, Binding, Block, BoolLiteral, FieldName, File, FuncCall, FuncName, ListLiteral, NameRef,
    NumberLiteral, StringLiteral, TypeAscription,
};

/// One method per node kind. Every method defaults to
/// [`visit_element`](Visitor::visit_element), which does nothing.
///
/// Visiting a node does not visit its children; use [`walk`] for that.
pub trait Visitor {
    fn visit_element(&mut self, element: SyntaxElement<'_>) {
        _ = element;
    }

    fn visit_file(&mut self, tree: &SyntaxTree, node: File) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_func_call(&mut self, tree: &SyntaxTree, node: FuncCall) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_func_name(&mut self, tree: &SyntaxTree, node: FuncName) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_arg_list(&mut self, tree: &SyntaxTree, node: ArgList) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_block(&mut self, tree: &SyntaxTree, node: Block) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_binding(&mut self, tree: &SyntaxTree, node: Binding) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_field_name(&mut self, tree: &SyntaxTree, node: FieldName) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_type_ascription(&mut self, tree: &SyntaxTree, node: TypeAscription) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_number_literal(&mut self, tree: &SyntaxTree, node: NumberLiteral) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_string_literal(&mut self, tree: &SyntaxTree, node: StringLiteral) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_bool_literal(&mut self, tree: &SyntaxTree, node: BoolLiteral) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_list_literal(&mut self, tree: &SyntaxTree, node: ListLiteral) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }

    fn visit_name_ref(&mut self, tree: &SyntaxTree, node: NameRef) {
        self.visit_element(NodeOrToken::Node(node.syntax(tree)));
    }
}

/// Calls exactly one method of `visitor`, picked by the kind of `element`.
/// Tokens and `ERROR` nodes go to [`Visitor::visit_element`].
pub fn accept<V: Visitor + ?Sized>(element: SyntaxElement<'_>, visitor: &mut V) {
    let NodeOrToken::Node(node) = element else {
        return visitor.visit_element(element);
    };

    let tree = node.tree();
    let id = node.id();
    match node.kind() {
        FILE => visitor.visit_file(tree, File(id)),
        FUNC_CALL => visitor.visit_func_call(tree, FuncCall(id)),
        FUNC_NAME => visitor.visit_func_name(tree, FuncName(id)),
        ARG_LIST => visitor.visit_arg_list(tree, ArgList(id)),
        BLOCK => visitor.visit_block(tree, Block(id)),
        BINDING => visitor.visit_binding(tree, Binding(id)),
        FIELD_NAME => visitor.visit_field_name(tree, FieldName(id)),
        TYPE_ASCRIPTION => visitor.visit_type_ascription(tree, TypeAscription(id)),
        NUMBER_LITERAL => visitor.visit_number_literal(tree, NumberLiteral(id)),
        STRING_LITERAL => visitor.visit_string_literal(tree, StringLiteral(id)),
        BOOL_LITERAL => visitor.visit_bool_literal(tree, BoolLiteral(id)),
        LIST_LITERAL => visitor.visit_list_literal(tree, ListLiteral(id)),
        NAME_REF => visitor.visit_name_ref(tree, NameRef(id)),
        _ => visitor.visit_element(element),
    }
}

/// Accepts `visitor` on `node` and every node below it, in preorder.
pub fn walk<V: Visitor + ?Sized>(node: SyntaxNode<'_>, visitor: &mut V) {
    for node in node.descendants() {
        accept(NodeOrToken::Node(node), visitor);
    }
}
