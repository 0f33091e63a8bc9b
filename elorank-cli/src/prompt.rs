/// Terminal judge: asks a person which of two items wins.
use std::io::{BufRead, Write};

use elorank_core::{Judge, Phase, RatingUpdate, Verdict};

use crate::parse::parse_verdict;

/// Default question shown above each pair.
pub const DEFAULT_QUESTION: &str = "Which is better?";

/// Reads verdicts line by line from `input` and writes prompts to `output`.
///
/// End of input counts as a request to stop, so piping a finite list of
/// answers works as well as typing them.
pub struct TerminalJudge<R, W> {
    input: R,
    output: W,
    question: String,
    /// Number shown next to the next prompt.
    next_number: usize,
    verbose: bool,
}

impl<R: BufRead, W: Write> TerminalJudge<R, W> {
    pub fn new(input: R, output: W, question: &str, completed: usize, verbose: bool) -> Self {
        TerminalJudge {
            input,
            output,
            question: question.to_string(),
            next_number: completed + 1,
            verbose,
        }
    }
}

/// Build the text shown for one comparison.
pub fn build_prompt(number: usize, question: &str, first: &str, second: &str) -> String {
    format!(
        "\n[#{number}] {question}\n\
         \x20 1) {first}\n\
         \x20 2) {second}\n\
         \x20 d) Draw    q) Quit\n\
         > "
    )
}

impl<R: BufRead, W: Write> Judge for TerminalJudge<R, W> {
    fn judge(&mut self, first: &str, second: &str) -> Verdict {
        let prompt = build_prompt(self.next_number, &self.question, first, second);
        loop {
            let _ = write!(self.output, "{prompt}");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return Verdict::Stop,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Failed to read answer: {e}");
                    return Verdict::Stop;
                }
            }

            if let Some(verdict) = parse_verdict(&line) {
                if verdict != Verdict::Stop {
                    self.next_number += 1;
                }
                return verdict;
            }
            let _ = writeln!(self.output, "Please answer 1, 2, d or q.");
        }
    }

    fn observe(&mut self, update: &RatingUpdate) {
        let _ = writeln!(
            self.output,
            "{}: ({:+.2}), {}: ({:+.2})",
            update.first,
            update.first_change(),
            update.second,
            update.second_change(),
        );
    }

    fn phase_changed(&mut self, phase: Phase) {
        if !self.verbose {
            return;
        }
        match phase {
            Phase::Coverage => eprintln!("Coverage phase: random pairings until every item has enough comparisons"),
            Phase::Refinement => eprintln!("Refinement phase: closest matchups first"),
            Phase::Stopped => eprintln!("Stopping."),
        }
    }
}
