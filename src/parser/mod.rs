// Source parsing for documentation recovered from comments

mod python;

pub use python::{PythonParser, SourceComments};
