//! WHERE Expression Module
//!
//! Boolean/comparison expressions over a single row.
//!
//! ## Grammar
//! ```text
//! expr    := expr OR expr | expr AND expr | NOT expr | operand cmp operand | ( expr )
//! cmp     := = | != | < | <= | > | >=
//! operand := identifier | number | 'string' | "string" | TRUE | FALSE
//! ```
//!
//! Binding, tightest first: comparisons, NOT, AND, OR.
//!
//! ## Evaluation
//! 1. Tokenize (whitespace skipped)
//! 2. Shunting-yard to postfix
//! 3. Evaluate on a value stack; exactly one value must remain

mod predicate;
mod tokenizer;

pub use predicate::{evaluate, Predicate};
pub use tokenizer::{tokenize, CompareOp, ExprToken};
