use std::{fs, path::Path};

use rustpython_parser::{ast, Parse};
use tracing::instrument;

mod import_name;
mod result;

pub use self::import_name::{ImportName, ImportSet};
pub use self::result::{ScanError, ScanResult};

/**
    Reads the script at the given path and collects every module it imports.

    See [`scan_source`] for the rules used when collecting names.

    # Errors

    - If the script can not be read.
    - If the script is not valid Python source.
*/
#[instrument(level = "debug", name = "scan::scan_script", skip_all, fields(path = %path.as_ref().display()))]
pub fn scan_script(path: impl AsRef<Path>) -> ScanResult<ImportSet> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    scan_source(&source, path)
}

/**
    Parses the given script source and collects every module it imports.

    The entire syntax tree is walked, so imports inside functions, classes,
    conditionals, loops, `with` blocks, `try` handlers and `match` arms are
    all found. Collected names:

    - `import a.b` collects `a.b`
    - `from m import x` collects `m` and `m.x`
    - `from m import *` collects `m`
    - `from .m import x` collects `.m` and `.m.x`
    - `from . import x` collects `.x`

    The script path is only used for error messages.

    # Errors

    If the source is not valid Python. No partial results are returned.
*/
pub fn scan_source(source: &str, path: impl AsRef<Path>) -> ScanResult<ImportSet> {
    let path = path.as_ref();
    let suite = ast::Suite::parse(source, &path.to_string_lossy()).map_err(|err| {
        ScanError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;

    let mut imports = ImportSet::new();
    visit_body(&suite, &mut imports);

    tracing::debug!(count = imports.len(), "collected imports");
    Ok(imports)
}

fn visit_body(body: &[ast::Stmt], imports: &mut ImportSet) {
    for stmt in body {
        visit_stmt(stmt, imports);
    }
}

fn visit_stmt(stmt: &ast::Stmt, imports: &mut ImportSet) {
    match stmt {
        ast::Stmt::Import(ast::StmtImport { names, .. }) => {
            for alias in names {
                imports.insert(ImportName::absolute(alias.name.as_str()));
            }
        }
        ast::Stmt::ImportFrom(ast::StmtImportFrom {
            module,
            names,
            level,
            ..
        }) => {
            let level = level.as_ref().map_or(0, ast::Int::to_u32);
            let base = ImportName::relative(level, module.as_ref().map_or("", |m| m.as_str()));
            if !base.is_empty() {
                imports.insert(base.clone());
            }
            for alias in names {
                let name = alias.name.as_str();
                if name != "*" {
                    imports.insert(base.child(name));
                }
            }
        }

        ast::Stmt::FunctionDef(ast::StmtFunctionDef { body, .. })
        | ast::Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { body, .. })
        | ast::Stmt::ClassDef(ast::StmtClassDef { body, .. })
        | ast::Stmt::With(ast::StmtWith { body, .. })
        | ast::Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => {
            visit_body(body, imports);
        }

        ast::Stmt::For(ast::StmtFor { body, orelse, .. })
        | ast::Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. })
        | ast::Stmt::While(ast::StmtWhile { body, orelse, .. })
        | ast::Stmt::If(ast::StmtIf { body, orelse, .. }) => {
            visit_body(body, imports);
            visit_body(orelse, imports);
        }

        ast::Stmt::Try(ast::StmtTry {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        })
        | ast::Stmt::TryStar(ast::StmtTryStar {
            body,
            handlers,
            orelse,
            finalbody,
            ..
        }) => {
            visit_body(body, imports);
            for handler in handlers {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                visit_body(&handler.body, imports);
            }
            visit_body(orelse, imports);
            visit_body(finalbody, imports);
        }

        ast::Stmt::Match(ast::StmtMatch { cases, .. }) => {
            for case in cases {
                visit_body(&case.body, imports);
            }
        }

        _ => {}
    }
}
