pub mod arithmetic;
pub mod documents;
pub mod page_text;
pub mod web_results;

pub use arithmetic::{AddTwoNumbersTool, SubtractTwoNumbersTool};
pub use documents::SearchDocumentsTool;
pub use page_text::GetTextFromUrlTool;
pub use web_results::GetWebResultsTool;
