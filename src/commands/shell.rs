use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::info;

use crate::{
    cli::CodeArgs,
    export::ExportFormat,
    helper::symbol_to_text,
    options::FIELDS,
    session::Session,
    AppCtx,
};

const HELP: &str = "\
Commands:
  set <key> [value]       change a field (text, format, size, margin, color, background, errorCorrection)
  show                    print the fields and the current preview
  svg                     print the current SVG
  export svg|png [DIR]    write the current code to DIR
  help                    print this message
  quit                    leave the shell
";

pub fn handle(args: CodeArgs, ctx: &AppCtx) -> Result<()> {
    let settings = ctx.settings_store.load()?;
    let mut session = Session::new(args.apply(settings.defaults));
    let dir = settings.output_dir.unwrap_or_else(|| PathBuf::from("."));

    info!("Type `help` for the list of commands");
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&mut session, &dir, stdin.lock(), stdout.lock())
}

/// Reads commands from `input` until `quit` or end of input.
///
/// Bad commands are reported on `output` and the loop goes on.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    default_dir: &Path,
    input: R,
    mut output: W,
) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    for line in input.lines() {
        let line = line?;
        // Values keep their spaces, only the command word is trimmed
        let line = line.trim_end_matches('\r').trim_start();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command.trim_end() {
            "" => {}
            "quit" | "exit" => break,
            "help" => write!(output, "{HELP}")?,
            "set" => {
                let rest = rest.trim_start();
                let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));
                if key.is_empty() {
                    writeln!(output, "usage: set <key> [value]")?;
                } else {
                    match session.set_field(key, value) {
                        Ok(()) => match session.last_error() {
                            Some(err) => {
                                writeln!(output, "error: {err} (keeping the last preview)")?
                            }
                            None => writeln!(output, "ok")?,
                        },
                        Err(err) => writeln!(output, "error: {err}")?,
                    }
                }
            }
            "show" => show(session, &mut output)?,
            "svg" => match session.preview() {
                Some(rendered) => write!(output, "{}", rendered.svg)?,
                None => writeln!(output, "nothing rendered yet")?,
            },
            "export" => {
                let rest = rest.trim();
                let (format, dir) = rest.split_once(' ').unwrap_or((rest, ""));
                let dir = match dir.trim() {
                    "" => default_dir.to_path_buf(),
                    dir => PathBuf::from(dir),
                };
                match format.parse::<ExportFormat>() {
                    Ok(format) => match session.export(format, &dir) {
                        Ok(path) => writeln!(output, "saved {}", path.display())?,
                        Err(err) => writeln!(output, "error: {err}")?,
                    },
                    Err(_) => writeln!(output, "usage: export svg|png [DIR]")?,
                }
            }
            other => writeln!(output, "unknown command {other:?}, try `help`")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

fn show<W: Write>(session: &Session, output: &mut W) -> Result<()> {
    for key in FIELDS {
        writeln!(output, "{key:>16}: {}", session.options().get_field(key)?)?;
    }
    if let Some(err) = session.last_error() {
        writeln!(output, "error: {err}")?;
    }
    if let Some(rendered) = session.preview() {
        write!(output, "{}", symbol_to_text(&rendered.symbol, 2))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodeOptions;
    use crate::symbology::Format;

    fn run_script(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run(session, Path::new("."), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn set_and_show() {
        let mut session = Session::new(CodeOptions::default());
        let out = run_script(&mut session, "set text hello world\nset format CODE128\nshow\n");
        assert_eq!(session.options().text, "hello world");
        assert_eq!(session.options().format, Format::Code128);
        assert!(out.contains("ok"));
        assert!(out.contains("format: CODE128"));
        assert!(out.contains("hello world\n"));
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let mut session = Session::new(CodeOptions::default());
        let out = run_script(
            &mut session,
            "set shape round\nfly\nset format EAN8\nset size 600\nquit\nset size 900\n",
        );
        assert!(out.contains("cannot find the attribute \"shape\""));
        assert!(out.contains("unknown command \"fly\""));
        assert!(out.contains("keeping the last preview"));
        assert_eq!(session.options().size, 600);
    }

    #[test]
    fn set_keeps_spaces_and_accepts_empty_values() {
        let mut session = Session::new(CodeOptions::default());
        run_script(&mut session, "set text   padded text  \r\n");
        assert_eq!(session.options().text, "  padded text  ");

        let out = run_script(&mut session, "set text\n");
        assert_eq!(session.options().text, "");
        assert!(out.contains("ok"));

        let out = run_script(&mut session, "set\n");
        assert!(out.contains("usage: set <key> [value]"));
    }

    #[test]
    fn svg_prints_the_preview() {
        let mut session = Session::new(CodeOptions::default());
        let out = run_script(&mut session, "svg\n");
        assert!(out.contains("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    }

    #[test]
    fn export_usage() {
        let mut session = Session::new(CodeOptions::default());
        let out = run_script(&mut session, "export gif\n");
        assert!(out.contains("usage: export svg|png [DIR]"));
    }
}
