pub mod boa;
pub mod context;
pub mod interpreter;

mod conversions;

#[cfg(test)]
mod tests;

pub use boa::BoaInterpreter;
pub use context::{Invocation, SharedContext};
pub use interpreter::{execute, Fault, Interpreter, Outcome};
