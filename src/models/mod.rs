pub mod dom;
pub mod question;

pub use dom::{DomNode, Element, FlatNode};
pub use question::{AnnotationBlock, AnswerResult, BlockKind, ImageCandidate, QuestionUnit, UnitId};
