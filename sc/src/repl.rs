//! Interactive calculator prompt
//!
//! Reads `<a> <op> <b>` expressions plus `history`, `help` and `exit`.
//! Every pipeline error is printed and the prompt continues.

use std::io::{self, Write};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use crate::calculator::Calculator;
use crate::error::{CalcError, ErrorKind};
use crate::input::{Command, parse_command};
use crate::launcher::MonitorLauncher;

/// What the prompt loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive REPL session
pub struct ReplSession {
    calculator: Calculator,
    launcher: Option<MonitorLauncher>,
}

impl ReplSession {
    pub fn new(calculator: Calculator, launcher: Option<MonitorLauncher>) -> Self {
        Self { calculator, launcher }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> Result<()> {
        self.start_monitor();
        self.print_welcome();

        let result = self.read_loop();
        self.shutdown();
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        let mut stdout = io::stdout();

        loop {
            match rl.readline(&format!("{} ", "calc>".bright_green())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if self.dispatch(input, &mut stdout)? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }
        Ok(())
    }

    /// Handle one line of input, writing all output to `out`
    pub fn dispatch(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        debug!(%line, "ReplSession::dispatch: called");
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                print_error(&e, out)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Exit => {
                writeln!(out, "Thanks for using the calculator, goodbye!")?;
                return Ok(Flow::Exit);
            }
            Command::Help => print_help(out)?,
            Command::History => self.print_history(out)?,
            Command::Calculate { a, op, b } => {
                writeln!(out, "{}", format!("Computing {} {} {} (progress is shown in the monitor)", a, op, b).dimmed())?;
                out.flush()?;
                match self.calculator.evaluate(a, &op, b) {
                    Ok(result) => {
                        writeln!(out, "{} {} {} {} = {}", "Result:".green(), a, op, b, result)?;
                        writeln!(out)?;
                    }
                    Err(e) => print_error(&e, out)?,
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn print_history(&self, out: &mut impl Write) -> io::Result<()> {
        let history = self.calculator.history();
        if history.is_empty() {
            writeln!(out, "{}", "No calculations yet.".dimmed())?;
            return writeln!(out);
        }

        writeln!(out, "{}", "Calculation history:".bright_cyan())?;
        for (i, record) in history.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, record)?;
        }
        writeln!(out)
    }

    fn print_welcome(&self) {
        let rule = "=".repeat(44);
        println!("{}", rule);
        println!("{}", format!("{:^44}", "StepCalc - add and subtract within 10").bright_cyan().bold());
        println!("{}", rule);
        println!("Operations: addition (+), subtraction (-)");
        println!("Input format: number operator number (e.g. {})", "3 + 5".yellow());
        println!(
            "Type {} for calculation history, {} for help, {} to quit",
            "history".yellow(),
            "help".yellow(),
            "exit".yellow()
        );
        if self.launcher.is_none() {
            println!("{}", "Run `sc monitor` in another terminal to watch progress.".dimmed());
        }
        println!();
    }

    fn start_monitor(&mut self) {
        let Some(launcher) = self.launcher.as_mut() else {
            return;
        };
        println!("Starting progress monitor...");
        if let Err(e) = launcher.start() {
            warn!("Monitor launch failed: {:#}", e);
            println!(
                "{} Could not start the progress monitor ({}); continuing without it",
                "!".yellow(),
                e
            );
            self.launcher = None;
        }
    }

    /// Publish the exit sentinel and reap the monitor
    fn shutdown(&mut self) {
        info!("REPL shutting down");
        self.calculator.signal_exit();
        if let Some(launcher) = self.launcher.as_mut()
            && let Err(e) = launcher.stop()
        {
            warn!("Failed to stop monitor: {:#}", e);
        }
    }
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Available Commands:".bright_cyan())?;
    writeln!(out, "  {:14} Add or subtract two numbers in 0-10", "<a> <op> <b>".yellow())?;
    writeln!(out, "  {:14} Show calculation history", "history".yellow())?;
    writeln!(out, "  {:14} Show this help", "help".yellow())?;
    writeln!(out, "  {:14} Exit the calculator", "exit".yellow())?;
    writeln!(out)
}

fn print_error(err: &CalcError, out: &mut impl Write) -> io::Result<()> {
    let label = match err.kind() {
        ErrorKind::Domain => "Error:".red(),
        ErrorKind::Integrity => "Integrity error:".yellow(),
        ErrorKind::Fatal => "Internal error:".red().bold(),
    };
    writeln!(out, "{} {}", label, err)?;
    writeln!(out)
}
