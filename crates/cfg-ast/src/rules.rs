//! The grammar as data: which children each node kind may have and which of
//! them are guaranteed by the grammar.

use cfg_yellow::SyntaxKind::{self, *};
use cfg_yellow::{MissingChildError, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Repeated,
}

/// One child slot of a rule. A slot with several kinds accepts any of them.
#[derive(Debug)]
pub struct ChildRule {
    pub kinds: &'static [SyntaxKind],
    pub presence: Presence,
}

#[derive(Debug)]
pub struct Rule {
    pub kind: SyntaxKind,
    pub name: &'static str,
    pub children: &'static [ChildRule],
}

const ITEM: &[SyntaxKind] = &[FUNC_CALL, BINDING];
const VALUE: &[SyntaxKind] =
    &[NUMBER_LITERAL, STRING_LITERAL, BOOL_LITERAL, LIST_LITERAL, FUNC_CALL, NAME_REF];

const fn required(kinds: &'static [SyntaxKind]) -> ChildRule {
    ChildRule { kinds, presence: Presence::Required }
}

const fn optional(kinds: &'static [SyntaxKind]) -> ChildRule {
    ChildRule { kinds, presence: Presence::Optional }
}

const fn repeated(kinds: &'static [SyntaxKind]) -> ChildRule {
    ChildRule { kinds, presence: Presence::Repeated }
}

pub static RULES: &[Rule] = &[
    Rule { kind: FILE, name: "File", children: &[repeated(ITEM), required(&[EOF])] },
    Rule {
        kind: FUNC_CALL,
        name: "FuncCall",
        children: &[required(&[FUNC_NAME]), required(&[ARG_LIST]), optional(&[BLOCK])],
    },
    Rule { kind: FUNC_NAME, name: "FuncName", children: &[required(&[NAME])] },
    Rule {
        kind: ARG_LIST,
        name: "ArgList",
        children: &[
            required(&[LEFT_PAREN]),
            repeated(VALUE),
            repeated(&[COMMA]),
            required(&[RIGHT_PAREN]),
        ],
    },
    Rule {
        kind: BLOCK,
        name: "Block",
        children: &[required(&[LEFT_BRACE]), repeated(ITEM), required(&[RIGHT_BRACE])],
    },
    Rule {
        kind: BINDING,
        name: "Binding",
        children: &[
            required(&[FIELD_NAME]),
            optional(&[TYPE_ASCRIPTION]),
            required(&[EQ]),
            required(VALUE),
            optional(&[SEMICOLON, COMMA]),
        ],
    },
    Rule { kind: FIELD_NAME, name: "FieldName", children: &[required(&[NAME])] },
    Rule {
        kind: TYPE_ASCRIPTION,
        name: "TypeAscription",
        children: &[required(&[COLON]), required(&[NAME])],
    },
    Rule {
        kind: NUMBER_LITERAL,
        name: "NumberLiteral",
        children: &[optional(&[MINUS]), required(&[INT_NUMBER, FLOAT_NUMBER])],
    },
    Rule { kind: STRING_LITERAL, name: "StringLiteral", children: &[required(&[STRING])] },
    Rule { kind: BOOL_LITERAL, name: "BoolLiteral", children: &[required(&[TRUE_KW, FALSE_KW])] },
    Rule {
        kind: LIST_LITERAL,
        name: "ListLiteral",
        children: &[
            required(&[LEFT_BRACKET]),
            repeated(VALUE),
            repeated(&[COMMA]),
            required(&[RIGHT_BRACKET]),
        ],
    },
    Rule { kind: NAME_REF, name: "NameRef", children: &[required(&[NAME])] },
];

/// The rule producing `kind`, if it is a node kind with one.
pub fn rule(kind: SyntaxKind) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.kind == kind)
}

/// Checks every node of `tree` for required children, in preorder.
///
/// A missing choice of several kinds is reported as its first kind.
pub fn validate(tree: &SyntaxTree) -> Vec<MissingChildError> {
    let mut errors = Vec::new();

    for node in tree.root().descendants() {
        let Some(rule) = rule(node.kind()) else {
            continue;
        };

        for child in rule.children.iter().filter(|child| child.presence == Presence::Required) {
            let present = node.children_with_tokens().any(|it| child.kinds.contains(&it.kind()));
            if !present {
                errors.push(MissingChildError {
                    parent: node.kind(),
                    expected: child.kinds[0],
                    range: node.text_range(),
                });
            }
        }
    }

    errors
}
