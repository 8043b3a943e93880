// ============================================================
// Layer 1 — Interactive Menu
// ============================================================
// A numbered menu for running tasks one after another:
//
//   0 : Exit the program
//   1 : Label data set
//   2 : Build training and test set
//   3 : Convert ARFF file
//   4 : Edit features
//
// The split task is where the menu matters most: it partitions
// the labeled file first, shows every label with its record
// count, then asks how many of each to put in the training set.
//
// A failed task prints its error and returns to the menu; end
// of input leaves the menu cleanly.

use anyhow::Result;
use std::{
    fmt,
    io::{BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

use crate::application::{
    convert_use_case::ConvertUseCase,
    edit_use_case::EditUseCase,
    label_use_case::{LabelJob, LabelUseCase},
    split_use_case::SplitUseCase,
};
use crate::cli::{print_conversion, print_label_outcome, print_split_outcome};
use crate::data::{feature_editor::ColumnSelection, sampler::SampleCounts};
use crate::domain::sample_request::SampleRequest;
use crate::infra::{config::PipelineConfig, prompt::Prompter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Exit,
    Label,
    Split,
    Convert,
    EditFeatures,
}

impl MenuCommand {
    pub const ALL: [MenuCommand; 5] = [
        MenuCommand::Exit,
        MenuCommand::Label,
        MenuCommand::Split,
        MenuCommand::Convert,
        MenuCommand::EditFeatures,
    ];

    pub fn description(self) -> &'static str {
        match self {
            MenuCommand::Exit => "Exit the program",
            MenuCommand::Label => "Label data set",
            MenuCommand::Split => "Build training and test set",
            MenuCommand::Convert => "Convert ARFF file",
            MenuCommand::EditFeatures => "Edit features",
        }
    }
}

impl fmt::Display for MenuCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for MenuCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not an option number", s.trim()))?;
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| format!("no option {index}"))
    }
}

pub struct Session<R, W> {
    prompter: Prompter<R, W>,
    config:   PipelineConfig,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: PipelineConfig) -> Self {
        Self {
            prompter: Prompter::new(input, output),
            config,
        }
    }

    /// Show the menu and run tasks until Exit or end of input.
    pub fn run(&mut self) -> Result<()> {
        self.prompter.say("\nWelcome to label-split!\n")?;
        loop {
            self.prompter.say("Choose an option")?;
            for (i, cmd) in MenuCommand::ALL.iter().enumerate() {
                self.prompter.say(format_args!("{i} : {cmd}"))?;
            }

            let Some(answer) = self.prompter.read_answer("")? else {
                return Ok(());
            };
            let command = match answer.parse::<MenuCommand>() {
                Ok(c) => c,
                Err(e) => {
                    self.prompter.say(format_args!("Invalid input: {e}\n"))?;
                    continue;
                }
            };
            tracing::debug!("Menu selection: {command:?}");

            let result = match command {
                MenuCommand::Exit => return Ok(()),
                MenuCommand::Label => self.label(),
                MenuCommand::Split => self.split(),
                MenuCommand::Convert => self.convert(),
                MenuCommand::EditFeatures => self.edit_features(),
            };
            if let Err(e) = result {
                tracing::debug!("Task failed: {e:?}");
                self.prompter.say(format_args!("Error: {e:#}"))?;
            }
            self.prompter.say("")?;
        }
    }

    fn label(&mut self) -> Result<()> {
        self.prompter.say("Label a data set")?;
        let rules = self.prompter.ask_string_or("rule file", "label.rules")?;
        let data = self.prompter.ask_string("file name")?;

        let job = LabelJob {
            rules_path: PathBuf::from(rules),
            data_path:  PathBuf::from(data),
            out_path:   None,
        };
        let outcome = LabelUseCase::new(job, self.config.clone()).execute()?;
        print_label_outcome(self.prompter.out(), &outcome)
    }

    fn split(&mut self) -> Result<()> {
        self.prompter.say("Building train and test set")?;
        let data = self.prompter.ask_string("file name")?;

        let use_case = SplitUseCase::new(data, self.config.clone());
        let partition = use_case.partition()?;
        if partition.is_empty() {
            self.prompter.say("The file holds no records")?;
            return Ok(());
        }

        self.prompter.say("Please enter the number of each label you'd like in the training set.")?;
        self.prompter.say("Enter 'all' (or -1) for every record, 0 or 'none' for no records.")?;
        let mut counts = SampleCounts::new(SampleRequest::None);
        for (label, available) in partition.counts() {
            self.prompter.say(format_args!("label: {label} max: {available}"))?;
            loop {
                let request: SampleRequest = self.prompter.ask("count")?;
                match request.resolve(&label, available) {
                    Ok(_) => {
                        counts.set(label.clone(), request);
                        break;
                    }
                    Err(e) => self.prompter.say(format_args!("Invalid input: {e}"))?,
                }
            }
        }

        let outcome = use_case.sample(partition, &counts)?;
        print_split_outcome(self.prompter.out(), &outcome)
    }

    fn convert(&mut self) -> Result<()> {
        self.prompter.say("Converting data file from ARFF")?;
        let arff = self.prompter.ask_string("arff file")?;
        let (conversion, out) = ConvertUseCase::new(arff, None).execute()?;
        print_conversion(self.prompter.out(), &conversion, &out)
    }

    fn edit_features(&mut self) -> Result<()> {
        self.prompter.say("Edit the feature set")?;
        let data = self.prompter.ask_string("file name")?;
        let columns: ColumnSelection = self.prompter.ask("columns to drop")?;
        let (written, out) =
            EditUseCase::new(data, columns, None, self.config.delimiter).execute()?;
        self.prompter
            .say(format_args!("Wrote {written} record(s) to {}", out.display()))
    }
}
