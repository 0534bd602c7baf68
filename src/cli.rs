//! CLI: schema JSON → (grammar | docs | both), one schema or a batch.
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;

use crate::error::Error;
use crate::path_de::{self, PathError};
use crate::schema::FunctionSpec;
use crate::{Grammar, PRIMITIVE_GRAMMAR, files, render_documentation};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile function-call schemas into a constrained-decoding grammar and plain-text docs
#[derive(Parser, Debug)]
#[command(name = "fncall-grammar", version)]
pub struct CommandLineInterface {
    /// log filter, e.g. `debug` or `fncall_grammar=trace` (falls back to RUST_LOG, then `info`)
    #[arg(long, global = true)]
    log: Option<String>,

    /// debugging: print the parsed arguments and exit
    #[arg(long, global = true)]
    no_op: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile and print the grammar
    Grammar(GrammarOut),
    /// render the documentation
    Docs(DocsOut),
    /// write grammar and documentation together
    Build(BuildOut),
    /// compile every input file on its own, in parallel
    Batch(BatchOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the schema inside each document (e.g. /assistant/functions)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one schema document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct PrimitiveSettings {
    /// primitive token grammar appended verbatim (bundled `string`/`number`/`boolean`/`ws` if omitted)
    #[arg(long)]
    primitives: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct GrammarOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    primitive_settings: PrimitiveSettings,

    /// output .gbnf file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DocsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .txt file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct BuildOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    primitive_settings: PrimitiveSettings,

    /// output .gbnf file
    #[arg(long)]
    grammar_out: PathBuf,

    /// output documentation file
    #[arg(long)]
    docs_out: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct BatchOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    primitive_settings: PrimitiveSettings,

    /// directory receiving `<stem>.gbnf` and `<stem>.txt` per input
    #[arg(long)]
    out_dir: PathBuf,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// All functions from all inputs, in input order.
    fn load_functions(&self) -> anyhow::Result<Vec<FunctionSpec>> {
        let mut functions = Vec::new();
        for path in resolve_file_path_patterns(&self.input)? {
            functions.extend(self.load_file(&path)?);
        }
        tracing::debug!(functions = functions.len(), "loaded schema");
        Ok(functions)
    }

    fn load_file(&self, path: &Path) -> anyhow::Result<Vec<FunctionSpec>> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io("read schema", path, e))?;
        let document = path_de::from_str_with_path::<Value>(&source).map_err(|e| parse_error(path, e))?;

        let document = match self.json_pointer.as_deref() {
            None => document,
            Some(pointer) => document
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer `{pointer}` matched nothing in {}", path.display()))?,
        };

        let documents = match self.jq_expr.as_deref() {
            None => vec![document],
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &document)
                .with_context(|| format!("failed to apply jq expression to {}", path.display()))?,
        };

        let mut functions = Vec::new();
        for document in documents {
            functions.extend(path_de::functions_from_value(document).map_err(|e| parse_error(path, e))?);
        }
        Ok(functions)
    }
}

impl PrimitiveSettings {
    fn load(&self) -> anyhow::Result<Cow<'static, str>> {
        match &self.primitives {
            None => Ok(Cow::Borrowed(PRIMITIVE_GRAMMAR)),
            Some(path) => Ok(Cow::Owned(files::read_primitives(path)?)),
        }
    }
}

impl BatchOut {
    fn compile_one(&self, path: &Path, primitives: &str) -> anyhow::Result<()> {
        let functions = self.input_settings.load_file(path)?;
        let compilation = crate::compile(&functions, primitives)
            .with_context(|| format!("failed to compile {}", path.display()))?;
        let stem = output_stem(path)?;
        compilation.write(
            &self.out_dir.join(format!("{stem}.gbnf")),
            &self.out_dir.join(format!("{stem}.txt")),
        )?;
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_deref()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        // debug path
        if self.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }
        match &self.cmd {
            Command::Grammar(target) => {
                let functions = target.input_settings.load_functions()?;
                let primitives = target.primitive_settings.load()?;
                let grammar = Grammar::compile(&functions)?;
                emit_output(target.out.as_deref(), &grammar.render_with(&primitives))
            }
            Command::Docs(target) => {
                let functions = target.input_settings.load_functions()?;
                emit_output(target.out.as_deref(), &render_documentation(&functions))
            }
            Command::Build(target) => {
                let functions = target.input_settings.load_functions()?;
                let primitives = target.primitive_settings.load()?;
                let compilation = crate::compile(&functions, &primitives)?;
                compilation.write(&target.grammar_out, &target.docs_out)?;
                Ok(())
            }
            Command::Batch(target) => {
                let paths = resolve_file_path_patterns(&target.input_settings.input)?;
                let mut stems = HashSet::new();
                for path in &paths {
                    if !stems.insert(output_stem(path)?) {
                        bail!("two inputs share the output name of {}", path.display());
                    }
                }
                let primitives = target.primitive_settings.load()?;

                // independent compilations: no shared state besides the read-only fragment
                let failures = paths
                    .par_iter()
                    .filter_map(|path| target.compile_one(path, &primitives).err())
                    .collect::<Vec<_>>();

                for error in &failures {
                    tracing::error!("{error:#}");
                }
                if !failures.is_empty() {
                    bail!("{} of {} schemas failed", failures.len(), paths.len());
                }
                tracing::info!(schemas = paths.len(), out_dir = %target.out_dir.display(), "batch complete");
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn parse_error(path: &Path, error: PathError) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        json_path: error.json_path,
        message: error.message,
    }
}

fn output_stem(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("cannot derive an output name from {}", path.display()))
}

fn emit_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    if let Some(out) = out {
        files::write_document(out, text)?;
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes()).context("failed to write to stdout")?;
    if !text.ends_with('\n') {
        writeln!(stdout).context("failed to write to stdout")?;
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }

        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern}"))? {
            out.push(entry?);
        }
        if out.len() == before {
            // explicitly a glob but matched nothing -> surface as an error
            bail!("glob pattern matched no files: {pattern}");
        }
    }

    Ok(out)
}
