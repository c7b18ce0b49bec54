mod report;
pub use report::*;

mod verifier;
pub use verifier::*;

mod compose;
pub use compose::*;
