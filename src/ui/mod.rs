// Presentation layer
//
// Turns MonitorEvents into console output. Nothing in here feeds back into
// the monitor.

pub mod console;

pub use console::ConsoleReporter;
