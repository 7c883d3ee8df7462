use std::env;
use std::path::Path;
use vbjs_translator::{logging, pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize global logging system
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.bas>", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let input_path = Path::new(&args[1]);
    if !input_path.is_file() {
        eprintln!("Error: Input must be a macro source file");
        eprintln!("  File: {}", input_path.display());
        std::process::exit(1);
    }

    process_single_file(&args[1])
}

fn print_help(program_name: &str) {
    println!("vbjs_translator v{}", env!("CARGO_PKG_VERSION"));
    println!("Syntactic VBA-to-JavaScript macro translator");
    println!();
    println!("USAGE:");
    println!("    {} <input.bas>     # Convert one file to stdout", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <input.bas>    Path to the macro source file to convert");
    println!();
    println!("OPTIONS:");
    println!("    --help         Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    VBJS_LOG_LEVEL=error|warn|info|debug   Logging verbosity (stderr)");
    println!("    VBJS_LOG_FORMAT=json                   Structured log events");
    println!("    VBJS_EMIT_SOURCE_COMMENTS=false        Drop trailing source comments");
    println!();
    println!("OUTPUT:");
    println!("    Generated JavaScript on stdout, one statement per line.");
    println!("    Constructs with no target equivalent are passed through as");
    println!("    commented-out lines marked UNTOUCHED.");
}

fn process_single_file(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    match pipeline::process_file(file_path) {
        Ok(result) => {
            print!("{}", result.javascript);
            Ok(())
        }
        Err(error) => {
            eprintln!("FAILED: {}", error);
            print_detailed_error(&error);
            std::process::exit(1);
        }
    }
}

fn print_detailed_error(error: &pipeline::PipelineError) {
    match error {
        pipeline::PipelineError::FileProcessing(file_err) => {
            eprintln!("File processing stage failed:");
            eprintln!("  {}", file_err);
        }
        pipeline::PipelineError::Preprocess(pre_err) => {
            eprintln!("Preprocessing stage failed:");
            eprintln!("  {}", pre_err);
        }
        pipeline::PipelineError::Translation(translate_err) => {
            eprintln!("Translation stage failed:");
            eprintln!("  {}", translate_err);
            if let Some(line) = translate_err.line() {
                eprintln!("  at source line {}", line);
            }
        }
        pipeline::PipelineError::Pipeline { message } => {
            eprintln!("Pipeline error: {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbjs_translator::syntax::TranslationError;

    #[test]
    fn test_error_summary_includes_line() {
        let error = pipeline::PipelineError::Translation(TranslationError::UnexpectedEndOfInput {
            line: 4,
            text: "If a Then".into(),
        });
        // Just exercise the printer; it must not panic
        print_detailed_error(&error);
    }
}
