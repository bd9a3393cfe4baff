//! Local disposition of a report: printing, and terminating the process.

/// Where the reporter prints messages and how it terminates the process.
///
/// [`StdConsole`] is the default. Swapping the console is mostly useful in
/// tests, where terminating the test process is undesirable; an
/// implementation of [`terminate`](Console::terminate) must still diverge,
/// for example by panicking.
pub trait Console: Send + Sync + 'static {
    /// Prints a reported message.
    fn print(&self, message: &str);

    /// Prints a fatal message and terminates the process.
    fn terminate(&self, message: &str) -> !;
}

/// Prints to standard output and exits with status `1` on fatal reports.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdConsole;

/// Exit status used by [`StdConsole::terminate`].
pub const FATAL_EXIT_CODE: i32 = 1;

impl Console for StdConsole {
    fn print(&self, message: &str) {
        println!("{message}");
    }

    fn terminate(&self, message: &str) -> ! {
        eprintln!("{message}");
        std::process::exit(FATAL_EXIT_CODE)
    }
}
