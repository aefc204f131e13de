// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of ProgressPrinter structure for printing the progress of trajectory reading.

use colored::{ColoredString, Colorize};
use std::io::Write;

/// Progress of trajectory reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    /// Trajectory reading is in progress.
    Running,
    /// Trajectory has been read completely.
    Completed,
    /// Trajectory reading failed.
    Failed,
}

/// Status label printed by `ProgressPrinter`. At most 9 characters long.
#[derive(Debug, Clone, PartialEq)]
struct ProgressMessage {
    msg: ColoredString,
}

impl ProgressMessage {
    /// Create new `ProgressMessage`.
    ///
    /// ## Panics
    /// Panics if the string is longer than 9 characters.
    fn new(string: ColoredString) -> Self {
        if string.chars().count() > 9 {
            panic!("FATAL HBOND ERROR | ProgressMessage::new | `ProgressMessage` can not be longer than 9 characters.");
        }

        ProgressMessage { msg: string }
    }

    /// Format the message, optionally with colors.
    fn format(&self, colored: bool) -> String {
        if colored {
            format!("[{: ^9}]   ", self.msg)
        } else {
            format!("[{: ^9}]   ", self.msg.as_ref() as &str)
        }
    }
}

/// Structure handling printing of progress of reading a trajectory file.
/// Constructed using `ProgressPrinter::new()` and associated with the given
/// trajectory reader using `TrajMasterRead::print_progress()`.
///
/// Failing to write progress information never interrupts the trajectory reading.
pub struct ProgressPrinter {
    /// Stream to write the progress info to. Default: standard error output.
    output: Box<dyn Write + Send>,
    /// Current status of reading. Default: ProgressStatus::Running.
    status: ProgressStatus,
    /// Print every `print_freq`th frame. Default: 100 frames.
    print_freq: usize,
    /// If true, the output will be colored. Default: true.
    colored: bool,
    /// Default: "Frame".blue().
    frame_msg: ColoredString,
    /// Default: "Step".cyan().
    step_msg: ColoredString,
    /// Default: "Time".bright_purple().
    time_msg: ColoredString,
    /// Default: "RUNNING".yellow().
    running_msg: ProgressMessage,
    /// Default: "COMPLETED".green().
    completed_msg: ProgressMessage,
    /// Default: "FAILED!".red().
    failed_msg: ProgressMessage,
    /// String terminating the progress message. Default: `\r` (carriage return).
    terminating: String,
}

impl ProgressPrinter {
    /// Create an instance of `ProgressPrinter` with default parameters.
    ///
    /// You can set custom values for any of the parameters by using `with_%PARAMETER()` method
    /// when constructing the `ProgressPrinter`.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    /// use colored::Colorize;
    ///
    /// let printer = ProgressPrinter::new()
    ///     .with_print_freq(500)
    ///     .with_running_msg("READING".yellow());
    ///
    /// let mut system = System::from_file("topology.pdb").unwrap();
    ///
    /// for frame in system
    ///     .dcd_iter("trajectory.dcd")
    ///     .unwrap()
    ///     .print_progress(printer)
    /// {
    ///     let frame = frame.unwrap();
    ///     // analyze the frame
    /// }
    /// ```
    pub fn new() -> Self {
        ProgressPrinter {
            output: Box::from(std::io::stderr()),
            status: ProgressStatus::Running,
            print_freq: 100,
            colored: true,
            frame_msg: "Frame".blue(),
            step_msg: "Step".cyan(),
            time_msg: "Time".bright_purple(),
            running_msg: ProgressMessage::new("RUNNING".yellow()),
            completed_msg: ProgressMessage::new("COMPLETED".green()),
            failed_msg: ProgressMessage::new("FAILED!".red()),
            terminating: String::from("\r"),
        }
    }

    /// Create new `ProgressPrinter` with specific `output` stream.
    pub fn with_output(mut self, stream: Box<dyn Write + Send>) -> Self {
        self.output = stream;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `print_freq`.
    /// Frequency of zero is treated as one.
    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        self.print_freq = print_freq.max(1);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `colored`.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Create new `ProgressPrinter` with specific value for `running_msg`.
    ///
    /// ## Panics
    /// Panics if the `running_msg` is longer than 9 characters.
    pub fn with_running_msg(mut self, running_msg: ColoredString) -> Self {
        self.running_msg = ProgressMessage::new(running_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `completed_msg`.
    ///
    /// ## Panics
    /// Panics if the `completed_msg` is longer than 9 characters.
    pub fn with_completed_msg(mut self, completed_msg: ColoredString) -> Self {
        self.completed_msg = ProgressMessage::new(completed_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `failed_msg`.
    ///
    /// ## Panics
    /// Panics if the `failed_msg` is longer than 9 characters.
    pub fn with_failed_msg(mut self, failed_msg: ColoredString) -> Self {
        self.failed_msg = ProgressMessage::new(failed_msg);
        self
    }

    /// Create new `ProgressPrinter` with specific value for `terminating`.
    pub fn with_terminating(mut self, string: &str) -> Self {
        self.terminating = string.to_string();
        self
    }

    /// Set new status to an already constructed `ProgressPrinter`.
    pub fn set_status(&mut self, status: ProgressStatus) {
        self.status = status;
    }

    /// Get the current status of the `ProgressPrinter`.
    pub fn get_status(&self) -> ProgressStatus {
        self.status
    }

    /// Print progress info about trajectory reading.
    ///
    /// While running, information is printed only every `print_freq`th frame.
    /// Completion and failure are always printed and terminated by a newline.
    pub fn print(&mut self, frame_number: usize, sim_step: u64, sim_time: f32) {
        if self.status == ProgressStatus::Running && frame_number % self.print_freq != 0 {
            return;
        }

        let label = match self.status {
            ProgressStatus::Running => self.running_msg.format(self.colored),
            ProgressStatus::Completed => self.completed_msg.format(self.colored),
            ProgressStatus::Failed => self.failed_msg.format(self.colored),
        };

        let (frame_msg, step_msg, time_msg) = if self.colored {
            (
                self.frame_msg.to_string(),
                self.step_msg.to_string(),
                self.time_msg.to_string(),
            )
        } else {
            (
                (self.frame_msg.as_ref() as &str).to_owned(),
                (self.step_msg.as_ref() as &str).to_owned(),
                (self.time_msg.as_ref() as &str).to_owned(),
            )
        };

        let ending = match self.status {
            ProgressStatus::Running => "",
            ProgressStatus::Completed | ProgressStatus::Failed => "\n",
        };

        let _ = write!(
            self.output,
            "{}{} {:10} | {} {:12} | {} {:12} ps{}{}",
            label,
            frame_msg,
            frame_number,
            step_msg,
            sim_step,
            time_msg,
            sim_time as u64,
            self.terminating,
            ending,
        );

        let _ = self.output.flush();
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::NamedTempFile;

    #[test]
    fn new() {
        let printer = ProgressPrinter::new();

        assert_eq!(printer.status, ProgressStatus::Running);
        assert_eq!(printer.print_freq, 100);
        assert!(printer.colored);
        assert_eq!(printer.frame_msg, "Frame".blue());
        assert_eq!(printer.step_msg, "Step".cyan());
        assert_eq!(printer.time_msg, "Time".bright_purple());
        assert_eq!(
            printer.running_msg,
            ProgressMessage::new("RUNNING".yellow())
        );
        assert_eq!(
            printer.completed_msg,
            ProgressMessage::new("COMPLETED".green())
        );
        assert_eq!(printer.failed_msg, ProgressMessage::new("FAILED!".red()));
        assert_eq!(printer.terminating, "\r");
    }

    #[test]
    fn new_complex() {
        let printer = ProgressPrinter::new()
            .with_print_freq(0)
            .with_colored(false)
            .with_running_msg("ANALYZING".red())
            .with_completed_msg("DONE".green())
            .with_failed_msg("FAILURE".on_bright_red())
            .with_terminating("\n");

        assert_eq!(printer.print_freq, 1);
        assert!(!printer.colored);
        assert_eq!(printer.running_msg, ProgressMessage::new("ANALYZING".red()));
        assert_eq!(printer.completed_msg, ProgressMessage::new("DONE".green()));
        assert_eq!(
            printer.failed_msg,
            ProgressMessage::new("FAILURE".on_bright_red())
        );
        assert_eq!(printer.terminating, "\n");
    }

    #[test]
    fn set_status() {
        let mut printer = ProgressPrinter::new();

        printer.set_status(ProgressStatus::Failed);
        assert_eq!(printer.get_status(), ProgressStatus::Failed);

        printer.set_status(ProgressStatus::Completed);
        assert_eq!(printer.get_status(), ProgressStatus::Completed);

        printer.set_status(ProgressStatus::Running);
        assert_eq!(printer.get_status(), ProgressStatus::Running);
    }

    #[test]
    #[should_panic(
        expected = "FATAL HBOND ERROR | ProgressMessage::new | `ProgressMessage` can not be longer than 9 characters."
    )]
    fn progress_message_panic() {
        let _msg = ProgressMessage::new("SHOULD_PANIC".red());
    }

    #[test]
    fn print() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path().to_owned();
        let handle = output.reopen().unwrap();

        let mut printer = ProgressPrinter::new()
            .with_output(Box::from(handle))
            .with_colored(false)
            .with_terminating("\n");

        printer.print(0, 0, 0.0);
        printer.print(1, 10, 10.0);
        printer.print(99, 990, 990.0);
        printer.print(100, 1000, 1000.0);
        printer.print(150, 1500, 1500.0);
        printer.print(200, 2000, 2000.0);
        printer.set_status(ProgressStatus::Completed);
        printer.print(201, 2010, 2010.0);
        printer.set_status(ProgressStatus::Failed);
        printer.print(202, 2020, 2020.0);

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/progress_expected.txt").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }
}
