// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Interactive prompts.
//!
//! Operations ask for input through [`Prompter`]; the terminal
//! implementation writes questions to stderr so stdout only carries results.

use std::io;

use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

/// Synchronous question/answer seam used by every operation.
pub trait Prompter {
    /// Free text, trimmed. May be empty.
    fn text(&self, message: &str) -> io::Result<String>;

    /// Hidden input (passphrases, private keys).
    fn password(&self, message: &str) -> io::Result<String>;

    fn confirm(&self, message: &str) -> io::Result<bool>;

    /// Index of the chosen entry of `choices`.
    fn select(&self, message: &str, choices: &[String]) -> io::Result<usize>;
}

/// Prompter drawing dialoguer widgets on stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn text(&self, message: &str) -> io::Result<String> {
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .allow_empty(true)
            .interact_text_on(&Term::stderr())
            .map_err(io_error)?;
        Ok(answer.trim().to_string())
    }

    fn password(&self, message: &str) -> io::Result<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .interact_on(&Term::stderr())
            .map_err(io_error)
    }

    fn confirm(&self, message: &str) -> io::Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(true)
            .interact_on(&Term::stderr())
            .map_err(io_error)
    }

    fn select(&self, message: &str, choices: &[String]) -> io::Result<usize> {
        ensure_choices(message, choices)?;
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(choices)
            .default(0)
            .interact_on(&Term::stderr())
            .map_err(io_error)
    }
}

fn io_error(error: dialoguer::Error) -> io::Error {
    match error {
        dialoguer::Error::IO(e) => e,
    }
}

fn ensure_choices(message: &str, choices: &[String]) -> io::Result<()> {
    if choices.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("nothing to choose for \"{message}\""),
        ));
    }
    Ok(())
}

/// Prompter replaying canned answers, one per question.
#[cfg(test)]
pub mod scripted {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    use super::Prompter;

    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: RefCell<VecDeque<String>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
                asked: RefCell::new(Vec::new()),
            }
        }

        /// Questions asked so far.
        pub fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }

        pub fn remaining(&self) -> usize {
            self.answers.borrow().len()
        }

        fn next(&self, message: &str) -> io::Result<String> {
            self.asked.borrow_mut().push(message.to_string());
            self.answers.borrow_mut().pop_front().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("no scripted answer for \"{message}\""),
                )
            })
        }
    }

    impl Prompter for ScriptedPrompter {
        fn text(&self, message: &str) -> io::Result<String> {
            self.next(message)
        }

        fn password(&self, message: &str) -> io::Result<String> {
            self.next(message)
        }

        fn confirm(&self, message: &str) -> io::Result<bool> {
            Ok(matches!(self.next(message)?.as_str(), "y" | "yes" | "true"))
        }

        fn select(&self, message: &str, choices: &[String]) -> io::Result<usize> {
            let answer = self.next(message)?;
            choices
                .iter()
                .position(|c| *c == answer)
                .or_else(|| answer.parse().ok().filter(|i| *i < choices.len()))
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("\"{answer}\" is not one of {choices:?}"),
                    )
                })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn answers_are_replayed_in_order() {
            let prompter = ScriptedPrompter::new(["k1", "yes", "b"]);
            assert_eq!(prompter.text("Tag").unwrap(), "k1");
            assert!(prompter.confirm("Encrypt?").unwrap());
            let choices = vec!["a".to_string(), "b".to_string()];
            assert_eq!(prompter.select("Pick", &choices).unwrap(), 1);
            assert_eq!(prompter.asked(), vec!["Tag", "Encrypt?", "Pick"]);
            assert!(prompter.text("More").is_err());
        }
    }
}
