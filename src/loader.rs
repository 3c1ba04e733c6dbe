//! The multi-file loader/compiler (§4.3).
//!
//! Reading source text from disk is explicitly out of the core's scope
//! (§1, §6): [`SourceProvider`] is the seam a host (the `cli` crate, or a
//! test) plugs a real filesystem or an in-memory fixture into.

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::ast::{Handler, LineRef, LineTarget, Statement};
use crate::constants::{
    FID_MAIN, FID_STD, MAIN_ALIAS, MAIN_DISPLAY_NAME, STD_ALIAS, STD_DISPLAY_NAME,
};
use crate::error::{CompileError, CompileResult, SourceLoc};
use crate::lexer::{strip_comment, tokenize};
use crate::parser::parse_statement;
use crate::strings::{preserve_strings, StringTable};
use matches::debug_assert_matches;

/// Supplies source text to the loader. Implementations decide how `LOAD`
/// paths and the standard library are located on whatever storage they
/// back onto; the loader only ever deals in path strings and file text.
pub trait SourceProvider {
    /// The root program's source, and a display name for diagnostics.
    /// `None` source (REPL with no preload) is represented by an empty
    /// string, same as an empty file.
    fn load_root(&mut self) -> Result<(String, String), String>;

    /// The always-present standard library, fid 2.
    fn load_std_lib(&mut self) -> Result<String, String>;

    /// A file named in a `LOAD <path> <alias>` declaration. Returns the
    /// source text and a display name (typically `path` itself).
    fn load_referenced(&mut self, path: &str) -> Result<(String, String), String>;
}

/// A [`SourceProvider`] backed by an in-memory map, for tests and for the
/// REPL's synthetic empty root.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    pub root: String,
    pub root_display: String,
    pub std_lib: String,
    pub files: HashMap<String, String>,
}

impl SourceProvider for MemoryProvider {
    fn load_root(&mut self) -> Result<(String, String), String> {
        Ok((self.root.clone(), self.root_display.clone()))
    }

    fn load_std_lib(&mut self) -> Result<String, String> {
        Ok(self.std_lib.clone())
    }

    fn load_referenced(&mut self, path: &str) -> Result<(String, String), String> {
        self.files
            .get(path)
            .cloned()
            .map(|src| (src, path.to_owned()))
            .ok_or_else(|| format!("No such file to LOAD: '{}'", path))
    }
}

#[derive(Clone, Debug)]
pub struct CompiledFile {
    pub fid: u32,
    pub display_name: String,
    pub lines: Vec<Option<Statement>>,
    pub labels: HashMap<String, u32>,
    pub alias_table: HashMap<String, u32>,
}

impl CompiledFile {
    pub fn max_line(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn line(&self, ln: u32) -> Option<&Statement> {
        if ln == 0 {
            return None;
        }
        self.lines.get((ln - 1) as usize).and_then(|s| s.as_ref())
    }
}

/// A fully loaded, validated program: every file's line/label/alias tables,
/// plus the shared string table built while preprocessing them.
#[derive(Clone, Debug)]
pub struct Program {
    pub files: Vec<CompiledFile>,
    pub strings: StringTable,
}

impl Program {
    pub fn file(&self, fid: u32) -> &CompiledFile {
        debug_assert_matches!(self.files.get((fid - 1) as usize), Some(_));
        &self.files[(fid - 1) as usize]
    }

    /// Compiles one REPL-entered line (§6, §12's "`evaluate_input`"): the
    /// same string-preservation / comment-stripping / whitespace-collapsing
    /// / uppercasing pipeline as a stored file line, but for a single line
    /// that is never appended to `MAIN`'s `lines` table. Any `LineRef` in
    /// the parsed statement is validated against the program as it stands
    /// (the same check the loader runs at compile time for stored lines),
    /// so the evaluator's `resolve_line_ref` can keep assuming aliases and
    /// labels were already checked. Returns `Ok(None)` for a blank line.
    ///
    /// `LOAD <path> <alias>` is not handled here — the REPL special-cases
    /// it before ever calling this, since only it has a [`SourceProvider`]
    /// to hand `load_additional`.
    pub fn compile_repl_line(&mut self, raw_line: &str) -> CompileResult<Option<Statement>> {
        let preserved = preserve_strings(&mut self.strings, raw_line);
        let without_comment = strip_comment(&preserved);
        let collapsed = collapse_whitespace(without_comment.trim());
        if collapsed.is_empty() {
            return Ok(None);
        }
        let upper = collapsed.to_uppercase();

        let tokens = tokenize(&upper).map_err(|msg| at(MAIN_DISPLAY_NAME, 0, msg))?;
        let stmt = parse_statement(&tokens).map_err(|msg| at(MAIN_DISPLAY_NAME, 0, msg))?;

        let main_file = self.file(FID_MAIN).clone();
        for line_ref in refs_in_statement(&stmt) {
            validate_line_ref(&self.files, &main_file, main_file.max_line() + 1, line_ref)?;
        }

        Ok(Some(stmt))
    }

    /// Compiles and appends one more file at runtime, wiring `alias` into
    /// `into_fid`'s alias table. Used by the REPL's special-cased `LOAD`
    /// (§6): a fresh fid is assigned, the new file is validated against the
    /// program as it stands, and only committed if that succeeds.
    pub fn load_additional(
        &mut self,
        provider: &mut dyn SourceProvider,
        path: &str,
        alias: &str,
        into_fid: u32,
    ) -> CompileResult<u32> {
        let (source, display_name) = provider
            .load_referenced(path)
            .map_err(|msg| CompileError::new(msg, SourceLoc::new(path.to_owned(), 0)))?;

        let preserved = preserve_strings(&mut self.strings, &source);
        let (blanked, loads) = extract_loads(&preserved, &display_name)?;
        if !loads.is_empty() {
            return Err(at(display_name, 0, "Nested LOAD from a REPL-loaded file is not supported"));
        }

        let new_fid = self.files.len() as u32 + 1;
        let mut alias_table = HashMap::new();
        alias_table.insert(MAIN_ALIAS.to_owned(), FID_MAIN);
        alias_table.insert(STD_ALIAS.to_owned(), FID_STD);

        let (lines, labels) = compile_lines(&blanked, &display_name)?;
        let new_file = CompiledFile { fid: new_fid, display_name, lines, labels, alias_table };

        let mut all_files = self.files.clone();
        all_files.push(new_file.clone());
        for (line_no, stmt) in new_file.lines.iter().enumerate() {
            if let Some(stmt) = stmt {
                for line_ref in refs_in_statement(stmt) {
                    validate_line_ref(&all_files, &new_file, (line_no + 1) as u32, line_ref)?;
                }
            }
        }

        self.files.push(new_file);
        self.files[(into_fid - 1) as usize]
            .alias_table
            .insert(alias.to_owned(), new_fid);
        Ok(new_fid)
    }
}

enum Pending {
    Root,
    StdLib,
    Named(String),
}

pub fn load(provider: &mut dyn SourceProvider) -> CompileResult<Program> {
    let mut files: Vec<CompiledFile> = Vec::new();
    let mut path_to_fid: HashMap<String, u32> = HashMap::new();
    let mut strings = StringTable::new();
    let mut worklist: VecDeque<(u32, Pending)> = VecDeque::new();

    worklist.push_back((FID_MAIN, Pending::Root));
    worklist.push_back((FID_STD, Pending::StdLib));
    let mut next_fid = FID_STD + 1;

    while let Some((fid, pending)) = worklist.pop_front() {
        let (source, display_name) = match &pending {
            Pending::Root => provider
                .load_root()
                .map_err(|msg| CompileError::new(msg, SourceLoc::new(MAIN_DISPLAY_NAME, 0)))?,
            Pending::StdLib => {
                let src = provider
                    .load_std_lib()
                    .map_err(|msg| CompileError::new(msg, SourceLoc::new(STD_DISPLAY_NAME, 0)))?;
                (src, STD_DISPLAY_NAME.to_owned())
            }
            Pending::Named(path) => provider
                .load_referenced(path)
                .map_err(|msg| CompileError::new(msg, SourceLoc::new(path.clone(), 0)))?,
        };

        let preserved = preserve_strings(&mut strings, &source);
        let (blanked, loads) = extract_loads(&preserved, &display_name)?;

        let mut alias_table = HashMap::new();
        alias_table.insert(MAIN_ALIAS.to_owned(), FID_MAIN);
        alias_table.insert(STD_ALIAS.to_owned(), FID_STD);

        for (alias, path) in loads {
            let load_fid = *path_to_fid.entry(path.clone()).or_insert_with(|| {
                let assigned = next_fid;
                next_fid += 1;
                worklist.push_back((assigned, Pending::Named(path.clone())));
                assigned
            });
            alias_table.insert(alias, load_fid);
        }

        let (lines, labels) = compile_lines(&blanked, &display_name)?;
        files.push(CompiledFile { fid, display_name, lines, labels, alias_table });
    }

    validate_references(&files)?;

    Ok(Program { files, strings })
}

/// Blanks out every `LOAD <path> <alias>` line (replacing its text with
/// nothing, never deleting the line) and returns the declarations found, in
/// the order they appeared.
pub(crate) fn extract_loads(source: &str, display_name: &str) -> CompileResult<(String, Vec<(String, String)>)> {
    let mut loads = Vec::new();
    let mut out_lines = Vec::with_capacity(source.lines().count());

    for (idx, raw_line) in source.split('\n').enumerate() {
        let line_no = (idx + 1) as u32;
        let trimmed = raw_line.trim();
        let mut words = trimmed.split_whitespace();

        match words.next() {
            Some(w) if w.eq_ignore_ascii_case("LOAD") => {
                let path = words
                    .next()
                    .ok_or_else(|| at(display_name, line_no, "LOAD requires a path"))?;
                let alias = words
                    .next()
                    .ok_or_else(|| at(display_name, line_no, "LOAD requires an alias"))?;
                if words.next().is_some() {
                    return Err(at(display_name, line_no, "LOAD takes exactly two arguments"));
                }
                loads.push((alias.to_ascii_uppercase(), path.to_owned()));
                out_lines.push(String::new());
            }
            _ => out_lines.push(raw_line.to_owned()),
        }
    }

    Ok((out_lines.join("\n"), loads))
}

/// Splits a file (already string-preserved and `LOAD`-extracted) into its
/// label table and per-line statement AST, per §4.3 step 5.
pub(crate) fn compile_lines(
    source: &str,
    display_name: &str,
) -> CompileResult<(Vec<Option<Statement>>, HashMap<String, u32>)> {
    let mut labels = HashMap::new();
    let mut lines: Vec<Option<Statement>> = Vec::new();

    for (idx, raw_line) in source.split('\n').enumerate() {
        let line_no = (idx + 1) as u32;
        lines.push(None);

        let without_comment = strip_comment(raw_line);
        let collapsed = collapse_whitespace(without_comment.trim());
        if collapsed.is_empty() {
            continue;
        }
        let upper = collapsed.to_uppercase();

        if let Some(label) = upper.strip_suffix(':') {
            if !is_valid_label(label) {
                return Err(at(display_name, line_no, format!("Invalid label name: '{}'", label)));
            }
            if labels.insert(label.to_owned(), line_no).is_some() {
                return Err(at(display_name, line_no, format!("Label '{}' appeared at least twice", label)));
            }
            continue;
        }

        let tokens = tokenize(&upper).map_err(|msg| at(display_name, line_no, msg))?;
        let stmt = parse_statement(&tokens).map_err(|msg| at(display_name, line_no, msg))?;
        *lines.last_mut().unwrap() = Some(stmt);
    }

    labels.entry("MAIN".to_owned()).or_insert(1);
    Ok((lines, labels))
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn at(display_name: impl Into<String>, line: u32, message: impl Into<String>) -> CompileError {
    CompileError::new(message.into(), SourceLoc::new(display_name.into(), line))
}

fn validate_references(files: &[CompiledFile]) -> CompileResult<()> {
    for file in files {
        for (line_no, stmt) in file.lines.iter().enumerate() {
            let stmt = match stmt {
                Some(stmt) => stmt,
                None => continue,
            };
            for line_ref in refs_in_statement(stmt) {
                validate_line_ref(files, file, (line_no + 1) as u32, line_ref)?;
            }
        }
    }
    Ok(())
}

fn validate_line_ref(
    files: &[CompiledFile],
    file: &CompiledFile,
    line_no: u32,
    line_ref: &LineRef,
) -> CompileResult<()> {
    let target_fid = match &line_ref.alias {
        Some(alias) => *file.alias_table.get(alias).ok_or_else(|| {
            at(file.display_name.clone(), line_no, format!("Unknown file alias '{}'", alias))
        })?,
        None => file.fid,
    };

    match &line_ref.target {
        LineTarget::Absolute(_) => Ok(()),
        LineTarget::Relative(_) => {
            if line_ref.alias.is_some() {
                Err(at(
                    file.display_name.clone(),
                    line_no,
                    "Relative line references ('~N') cannot cross files",
                ))
            } else {
                Ok(())
            }
        }
        LineTarget::Label(label) => {
            let target_file = files.iter().find(|f| f.fid == target_fid).expect("fid always resolves");
            if target_file.labels.contains_key(label) {
                Ok(())
            } else {
                Err(at(
                    file.display_name.clone(),
                    line_no,
                    format!("Undefined label '{}' in file '{}'", label, target_file.display_name),
                ))
            }
        }
    }
}

fn refs_in_statement(stmt: &Statement) -> Vec<&LineRef> {
    match stmt {
        Statement::Go(r) => vec![r],
        Statement::GoIf { target, .. } => vec![target],
        Statement::Jump { target, handlers, .. } => {
            let mut refs = vec![target];
            refs.extend(handlers.iter().map(|h: &Handler| &h.target));
            refs
        }
        Statement::Throw(_) | Statement::Return(_) | Statement::Into { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn provider(root: &str) -> MemoryProvider {
        MemoryProvider {
            root: root.to_owned(),
            root_display: "MAIN".to_owned(),
            std_lib: String::new(),
            files: HashMap::new(),
        }
    }

    #[test]
    fn implicit_main_label_defaults_to_line_one() {
        let program = load(&mut provider("\"5\" INTO X")).unwrap();
        assert_eq!(*program.file(FID_MAIN).labels.get("MAIN").unwrap(), 1);
    }

    #[test]
    fn explicit_main_label_overrides_default() {
        let program = load(&mut provider("GO END\nMAIN:\nEND:")).unwrap();
        assert_eq!(*program.file(FID_MAIN).labels.get("MAIN").unwrap(), 2);
    }

    #[test]
    fn duplicate_label_is_a_compile_error() {
        let err = load(&mut provider("A:\nA:")).unwrap_err();
        assert!(err.message.contains("appeared at least twice"));
    }

    #[test]
    fn undefined_label_reference_is_rejected() {
        let err = load(&mut provider("GO NOWHERE")).unwrap_err();
        assert!(err.message.contains("Undefined label"));
    }

    #[test]
    fn cross_file_relative_reference_is_rejected() {
        let mut p = provider("LOAD lib.goif L\nJUMP L:~1 ()");
        p.files.insert("lib.goif".to_owned(), "GREET:\nRETURN ()".to_owned());
        let err = load(&mut p).unwrap_err();
        assert!(err.message.contains("cannot cross files"));
    }

    #[test]
    fn load_line_is_blanked_not_deleted() {
        let mut p = provider("LOAD lib.goif L\nGO END\nEND:");
        p.files.insert("lib.goif".to_owned(), "RETURN ()".to_owned());
        let loaded = load(&mut p).unwrap();
        // GO END is on line 2, unaffected by the blanked LOAD line at 1.
        assert!(matches!(loaded.file(FID_MAIN).line(2), Some(Statement::Go(_))));
        assert!(loaded.file(FID_MAIN).alias_table.contains_key("L"));
    }

    #[test]
    fn cross_file_label_resolves_through_alias() {
        let mut p = provider("LOAD lib.goif L\nJUMP L:GREET ()");
        p.files.insert("lib.goif".to_owned(), "GREET:\nRETURN ()".to_owned());
        assert!(load(&mut p).is_ok());
    }

    #[test]
    fn dotted_label_can_be_defined_and_referenced() {
        let loaded = load(&mut provider("GO A.B\nA.B:")).unwrap();
        assert!(loaded.file(FID_MAIN).labels.contains_key("A.B"));
    }

    #[test]
    fn repl_line_compiles_a_single_statement() {
        let mut program = load(&mut provider("")).unwrap();
        let stmt = program.compile_repl_line("5 INTO X").unwrap().unwrap();
        assert!(matches!(stmt, Statement::Into { target, .. } if target == "X"));
    }

    #[test]
    fn repl_blank_line_is_none() {
        let mut program = load(&mut provider("")).unwrap();
        assert!(program.compile_repl_line("   % just a comment").unwrap().is_none());
    }

    #[test]
    fn repl_line_validates_references_against_the_loaded_program() {
        let mut program = load(&mut provider("")).unwrap();
        let err = program.compile_repl_line("GO NOWHERE").unwrap_err();
        assert!(err.message.contains("Undefined label"));
    }

    #[test]
    fn repl_line_interns_string_literals() {
        let mut program = load(&mut provider("")).unwrap();
        let stmt = program.compile_repl_line("\"hi\" INTO STDOUT").unwrap().unwrap();
        match stmt {
            Statement::Into { source: crate::ast::AssignSource::Expr(crate::ast::Expr::StrSigil(key)), .. } => {
                assert_eq!(program.strings.resolve(key), "hi");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn load_additional_wires_alias_into_target_file() {
        let mut p = provider("");
        p.files.insert("lib.goif".to_owned(), "GREET:\nRETURN ()".to_owned());
        let mut program = load(&mut p.clone()).unwrap();
        let fid = program.load_additional(&mut p, "lib.goif", "L", FID_MAIN).unwrap();
        assert_eq!(*program.file(FID_MAIN).alias_table.get("L").unwrap(), fid);
        assert!(program.file(fid).labels.contains_key("GREET"));
    }
}
