use crate::ast::Stmt;

/// A complete parsed program: the top-level scope.
///
/// The program owns every statement and expression node produced by one
/// parse session; the whole tree is freed in bulk when the program is
/// dropped at the end of the run. Runtime values borrow procedure nodes out
/// of it, so a `Program` must outlive its evaluator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
