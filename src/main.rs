use clap::{Parser as ClapParser, Subcommand};
use sprig_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "sprig")]
#[command(about = "Sprig - compile and evaluate expressions against JSON bindings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// The expression to evaluate
        expression: String,

        /// JSON object of variable bindings (reads from stdin if not provided)
        #[arg(short, long)]
        bindings: Option<String>,

        /// Skip operator type checks
        #[arg(long)]
        no_type_checks: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Compile an expression without evaluating it
    Check {
        /// The expression to compile
        expression: String,
    },

    /// List the tokens of an expression after optimization
    Tokens {
        /// The expression to tokenize
        expression: String,
    },

    /// Translate an expression into an SQL WHERE fragment
    Sql {
        /// The expression to translate
        expression: String,

        /// chrono format used for date-time literals
        #[arg(long)]
        date_format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            bindings,
            no_type_checks,
            pretty,
        } => run_eval(expression, bindings, !no_type_checks, pretty),
        Commands::Check { expression } => run_check(expression),
        Commands::Tokens { expression } => cli::list_tokens(&expression).map(|lines| {
            for line in lines {
                println!("{}", line);
            }
        }),
        Commands::Sql {
            expression,
            date_format,
        } => cli::translate_sql(&expression, date_format.as_deref()).map(|sql| println!("{}", sql)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(
    expression: String,
    bindings: Option<String>,
    checks_types: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let bindings = match bindings {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        expression,
        bindings,
        checks_types,
        syntax_only: false,
    };

    if let CheckResult::Success(output) = cli::execute_check(&options)? {
        let json = if pretty {
            serde_json::to_string_pretty(&output)
        } else {
            serde_json::to_string(&output)
        }?;
        println!("{}", json);
    }
    Ok(())
}

fn run_check(expression: String) -> Result<(), CliError> {
    let options = CheckOptions {
        expression,
        syntax_only: true,
        ..CheckOptions::default()
    };

    if let CheckResult::SyntaxValid { variables } = cli::execute_check(&options)? {
        println!("Syntax is valid");
        if !variables.is_empty() {
            println!("Variables: {}", variables.join(", "));
        }
    }
    Ok(())
}
