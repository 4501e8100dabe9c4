//! # Sprig Expression Language - Syntax Structures
//!
//! This module holds the data shared by every compilation phase:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer and consumed by the
//!   validator, optimizer and planner
//! - **[operators]** - The closed set of operator symbols with their
//!   precedence and display glyphs
//! - **[stage]** - Nodes of the compiled evaluation tree
//!
//! ## Pipeline
//!
//! ```text
//! text -> lexer -> tokens -> validator -> optimizer -> planner -> stage tree
//! ```
//!
//! ## Precedence
//!
//! From tightest to loosest:
//!
//! ```text
//! prefix - ! ~
//! **                      (right-associative)
//! * / %
//! + -
//! << >>
//! > >= < <= in
//! == != =~ !~
//! & | ^
//! &&
//! ||
//! ? :                     (right-associative)
//! ??                      (right-associative)
//! ```
pub mod operators;
pub mod stage;
pub mod tokens;

pub use operators::{OperatorSymbol, Precedence};
pub use stage::{CombinedTypeCheck, EvaluationStage, StageOperator, TypeCheck};
pub use tokens::{Token, TokenKind};
