pub use crate::ast::{Ast, NodeKind, Role, TreeVisitor};
pub use crate::engine::{canonicalize, parse_program};
pub use crate::errors::{print_error, ErrorKind, HackemeError, SourceContext};

pub mod ast;
pub mod engine;
pub mod errors;
pub mod grouping;
pub mod syntax;
