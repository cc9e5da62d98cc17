use rustyline::{
    completion::{Candidate, Completer},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context as RContext, Editor, Helper, Result as RResult,
};
use tracing::debug;

use lang::{
    codegen::{sexp::SexpCodeGenerator, CodeGenerator},
    runtime::{print::stdout_handler, serialize, Context},
    syntax::tree::Program,
    CompileError, Compiler,
};

use crate::config::Config;

const COMMANDS: [(&str, &str); 5] = [
    (":q", "Quit REPL"),
    (":{", "Start multi-line mode"),
    (":}", "End multi-line mode"),
    (":env", "Show top-level bindings"),
    (":ast", "Show how an expression parses"),
];

struct REPL {
    rl: Editor<REPLHelper>,
    cfg: Config,
    repl_run: bool,
    prompt: String,
    multiline: bool,
    multiline_buffer: Vec<String>,
}

enum CompleteCandidate {
    Command(String, String),
    Var(String),
}

impl Candidate for CompleteCandidate {
    fn display(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Var(name) => name,
        }
    }

    fn replacement(&self) -> &str {
        match self {
            CompleteCandidate::Command(cmd, _) => cmd,
            CompleteCandidate::Var(name) => name,
        }
    }
}

struct REPLHelper {
    context: Context,
}

impl Helper for REPLHelper {}

impl Completer for REPLHelper {
    type Candidate = CompleteCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &RContext<'_>,
    ) -> RResult<(usize, Vec<Self::Candidate>)> {
        let line = &line[..pos];
        if line.starts_with(':') {
            return Ok((
                0,
                COMMANDS
                    .iter()
                    .filter(|(cmd, _)| cmd.starts_with(line))
                    .map(|(cmd, help)| {
                        CompleteCandidate::Command(cmd.to_string(), help.to_string())
                    })
                    .collect(),
            ));
        }

        let start = line
            .rfind(|c: char| c.is_whitespace() || "()[]{}\"".contains(c))
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line[start..];
        Ok((
            start,
            self.context
                .env
                .bindings()
                .keys()
                .filter(|name| name.starts_with(word))
                .map(|name| CompleteCandidate::Var(name.to_string()))
                .collect(),
        ))
    }
}

impl Validator for REPLHelper {}

impl Hinter for REPLHelper {}

impl Highlighter for REPLHelper {}

impl REPL {
    fn new(cfg: Config) -> REPL {
        let mut repl = REPL {
            rl: Editor::<REPLHelper>::new(),
            cfg,
            repl_run: true,
            prompt: "aaqz> ".to_owned(),
            multiline: false,
            multiline_buffer: Vec::new(),
        };

        if let Some(ref path) = repl.cfg.history_file {
            let _ = repl.rl.load_history(path);
        }

        let mut helper = REPLHelper {
            context: Context::with_output(stdout_handler()),
        };

        helper.context.load_builtins();
        repl.rl.set_helper(Some(helper));
        repl
    }

    fn start(&mut self) {
        while self.repl_run {
            let readline = self.rl.readline(self.prompt.as_str());
            match readline {
                Ok(line) => {
                    if line.starts_with(':') {
                        self.process_command(line);
                        continue;
                    }

                    match self.multiline {
                        true => self.multiline_buffer.push(line),
                        _ => self.run_code(line),
                    }
                }

                Err(ReadlineError::Interrupted) => (),
                Err(ReadlineError::Eof) => {
                    break;
                }
                Err(err) => {
                    println!("ReadlineError: {:?}", err);
                    break;
                }
            }
        }
    }

    fn process_command(&mut self, line: String) {
        let (cmd, rest) = match line.find(char::is_whitespace) {
            Some(idx) => (&line[..idx], line[idx..].trim()),
            None => (line.as_str(), ""),
        };

        match cmd {
            ":{" => {
                self.multiline = true;
                self.prompt = "aaqz| ".to_owned();
            }

            ":}" => {
                self.multiline = false;
                self.prompt = "aaqz> ".to_owned();
                let code = self.multiline_buffer.join("\n");
                self.multiline_buffer.clear();
                self.run_code(code);
            }

            ":q" => {
                self.repl_run = false;
            }

            ":env" => {
                if let Some(helper) = self.rl.helper() {
                    for (name, value) in helper.context.env.bindings() {
                        println!("- {} = {}", name, value);
                    }
                }
            }

            ":ast" => match Compiler::compile(rest) {
                Ok(program) => SexpCodeGenerator::new()
                    .codegen(&program)
                    .iter()
                    .for_each(|datum| println!("{}", datum)),
                Err(err) => eprintln!("{}", err.with_path("<stdin>")),
            },

            _ => println!("REPL: Unknown command {}", line.as_str()),
        }
    }

    fn run_code(&mut self, line: String) {
        self.rl.add_history_entry(line.as_str());
        if let Some(helper) = self.rl.helper() {
            compile_and_run(&self.cfg, &helper.context, "<stdin>", line.as_str());
        }
    }
}

impl Drop for REPL {
    fn drop(&mut self) {
        if let Some(ref path) = self.cfg.history_file {
            let _ = self.rl.save_history(path);
        }
    }
}

fn compile(cfg: &Config, input: &str) -> Result<Program, CompileError> {
    let program = Compiler::compile(input)?;
    if cfg.dump_ast {
        SexpCodeGenerator::new()
            .codegen(&program)
            .iter()
            .for_each(|datum| eprintln!("{}", datum));
    }
    Ok(program)
}

/// Returns whether the program ran to completion.
fn compile_and_run(cfg: &Config, ctx: &Context, file: &str, input: &str) -> bool {
    debug!(file, "compile");
    let program = match compile(cfg, input) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", err.with_path(file));
            return false;
        }
    };

    debug!(file, forms = program.len(), "run");
    match ctx.source(&program).and_then(|value| value.map(|v| serialize(&v)).transpose()) {
        Ok(Some(text)) => {
            if !cfg.quiet {
                println!("{}", text);
            }
            true
        }
        Ok(None) => true,
        Err(err) => {
            eprintln!("{}", err);
            false
        }
    }
}

fn exit_code(success: bool) -> i32 {
    if success {
        0
    } else {
        1
    }
}

fn top_level_context() -> Context {
    let mut ctx = Context::with_output(stdout_handler());
    ctx.load_builtins();
    ctx
}

pub(crate) fn eval_main(cfg: Config, source: &str) -> i32 {
    exit_code(compile_and_run(&cfg, &top_level_context(), "<eval>", source))
}

pub(crate) fn cli_main(cfg: Config, input: Option<String>) -> i32 {
    if let Some(input) = input {
        let src = match std::fs::read_to_string(input.as_str()) {
            Ok(src) => src,
            Err(err) => {
                eprintln!("IOError: unable to open {}: {}", input, err);
                return 1;
            }
        };
        exit_code(compile_and_run(&cfg, &top_level_context(), input.as_str(), src.as_str()))
    } else {
        let mut repl = REPL::new(cfg);
        repl.start();
        0
    }
}
