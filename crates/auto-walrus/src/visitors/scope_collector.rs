//! Function-like scope discovery
//!
//! Collects the module scope plus every `def` / `async def` at any depth,
//! in source order. Class bodies are not scopes of their own here; the
//! methods inside them are.

use ruff_python_ast::{
    Expr, ModModule, Stmt, StmtFunctionDef,
    visitor::{Visitor, walk_stmt},
};

/// Root node of a scope
#[derive(Debug, Clone, Copy)]
pub enum ScopeRoot<'a> {
    Module(&'a ModModule),
    /// The function statement and its definition
    Function(&'a Stmt, &'a StmtFunctionDef),
}

/// A function-like scope whose direct statements are scanned for candidates
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub root: ScopeRoot<'a>,
}

impl<'a> Scope<'a> {
    /// Direct statements of the scope
    pub fn body(&self) -> &'a [Stmt] {
        match self.root {
            ScopeRoot::Module(module) => &module.body,
            ScopeRoot::Function(_, function) => &function.body,
        }
    }

    /// Name used in log messages
    pub fn name(&self) -> &'a str {
        match self.root {
            ScopeRoot::Module(_) => "<module>",
            ScopeRoot::Function(_, function) => function.name.as_str(),
        }
    }
}

/// Visitor that collects every function-like scope of a module
#[derive(Debug, Default)]
pub struct ScopeCollector<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> ScopeCollector<'a> {
    /// Module scope first, then functions in source order
    pub fn collect(module: &'a ModModule) -> Vec<Scope<'a>> {
        let mut collector = Self {
            scopes: vec![Scope {
                root: ScopeRoot::Module(module),
            }],
        };
        collector.visit_body(&module.body);
        collector.scopes
    }
}

impl<'a> Visitor<'a> for ScopeCollector<'a> {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        if let Stmt::FunctionDef(function) = stmt {
            self.scopes.push(Scope {
                root: ScopeRoot::Function(stmt, function),
            });
        }
        walk_stmt(self, stmt);
    }

    // Expressions never contain statements
    fn visit_expr(&mut self, _expr: &'a Expr) {}
}
