//! Interactive disambiguation prompt.
//!
//! Shown when a brand/material pair is missing from the vendor data. The
//! operator can reload the vendor file (once per filament), stop the import, or
//! pick one of the numbered material defaults. Reading is generic over
//! `BufRead`/`Write` so tests can script the session.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::enrich::{Decision, Disambiguator, Question, parse_decision};
use crate::error::{AppError, EXIT_INPUT};

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn render(&mut self, question: &Question<'_>) -> io::Result<()> {
        let out = &mut self.output;
        writeln!(
            out,
            "\nWarning: No vendor data found for '{}' - '{}'",
            question.brand, question.material
        )?;

        if !question.known_vendors.is_empty() {
            writeln!(out, "\nAvailable vendors in vendor data:")?;
            for vendor in question.known_vendors {
                writeln!(out, "  - {vendor}")?;
            }
        }

        writeln!(out, "\nAvailable default material types:")?;
        for (idx, m) in question.candidates.iter().enumerate() {
            writeln!(
                out,
                "{:>3}) {:<5} (spool: {}g, ext: {}°C, bed: {}°C, density: {:.2})",
                idx + 1,
                m.name,
                m.spool_weight,
                m.extruder_temp,
                m.bed_temp,
                m.density
            )?;
        }

        writeln!(out, "\nOptions:")?;
        if question.allow_reload {
            writeln!(out, "  r) Reload vendor data and try again")?;
        }
        writeln!(out, "  s) Stop import")?;
        writeln!(out, "  1-{}) Use that material's defaults", question.candidates.len())
    }

    fn choices(question: &Question<'_>) -> String {
        let n = question.candidates.len();
        if question.allow_reload {
            format!("r/s/1-{n}")
        } else {
            format!("s/1-{n}")
        }
    }
}

impl<R: BufRead, W: Write> Disambiguator for TerminalPrompt<R, W> {
    fn ask(&mut self, question: &Question<'_>) -> Result<Decision, AppError> {
        self.render(question).map_err(write_error)?;

        loop {
            write!(self.output, "\nChoose an option [{}]: ", Self::choices(question)).map_err(write_error)?;
            self.output.flush().map_err(write_error)?;

            let mut line = String::new();
            let bytes = self
                .input
                .read_line(&mut line)
                .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read input: {e}")))?;

            // EOF: nobody is there to answer.
            if bytes == 0 {
                writeln!(self.output, "\nNo input received, stopping import.").map_err(write_error)?;
                return Ok(Decision::Stop);
            }

            if let Some(decision) = parse_decision(&line, question.candidates.len(), question.allow_reload) {
                return Ok(decision);
            }
            writeln!(self.output, "Invalid choice: {}. Please try again.", line.trim()).map_err(write_error)?;
        }
    }
}

fn write_error(e: io::Error) -> AppError {
    AppError::new(EXIT_INPUT, format!("Failed to write prompt: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::catalog;

    fn ask(input: &str, allow_reload: bool) -> (Decision, String) {
        let vendors = vec!["Bambu Lab".to_string(), "Prusament".to_string()];
        let question = Question {
            brand: "Acme",
            material: "PLA Silk",
            candidates: catalog::defaults(),
            known_vendors: &vendors,
            allow_reload,
        };
        let mut prompt = TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let decision = prompt.ask(&question).unwrap();
        let output = String::from_utf8(prompt.into_output()).unwrap();
        (decision, output)
    }

    #[test]
    fn lists_vendors_candidates_and_options() {
        let (decision, output) = ask("2\n", true);
        assert_eq!(decision, Decision::Choose(2));
        assert!(output.contains("No vendor data found for 'Acme' - 'PLA Silk'"));
        assert!(output.contains("  - Prusament"));
        assert!(output.contains("  1) PLA   (spool: 250g, ext: 210°C, bed: 60°C, density: 1.24)"));
        assert!(output.contains("  r) Reload vendor data"));
        assert!(output.contains("[r/s/1-7]"));
    }

    #[test]
    fn reprompts_until_valid() {
        let (decision, output) = ask("banana\n9\n\ns\n", true);
        assert_eq!(decision, Decision::Stop);
        assert_eq!(output.matches("Please try again.").count(), 3);
    }

    #[test]
    fn reload_is_not_offered_after_a_reload() {
        let (decision, output) = ask("r\n3\n", false);
        assert_eq!(decision, Decision::Choose(3));
        assert!(!output.contains("r) Reload"));
        assert!(output.contains("[s/1-7]"));
        assert!(output.contains("Invalid choice: r."));
    }

    #[test]
    fn eof_stops_the_import() {
        let (decision, output) = ask("", true);
        assert_eq!(decision, Decision::Stop);
        assert!(output.contains("No input received"));
    }
}
